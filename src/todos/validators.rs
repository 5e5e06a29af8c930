use super::models::{CreateTodoRequest, UpdateTodoRequest};
use crate::common::{ValidationResult, Validator};

pub struct TodoValidator;

fn validate_text(text: &str, result: &mut ValidationResult) {
    if text.trim().is_empty() {
        result.add_error("text", "Text is required");
    }
}

impl Validator<CreateTodoRequest> for TodoValidator {
    fn validate(&self, data: &CreateTodoRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_text(&data.text, &mut result);
        result
    }
}

impl Validator<UpdateTodoRequest> for TodoValidator {
    fn validate(&self, data: &UpdateTodoRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(text) = &data.text {
            validate_text(text, &mut result);
        }
        result
    }
}
