use super::Widget;

/// Plain text input
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWidget;

impl Widget for TextWidget {
    fn type_name(&self) -> &'static str {
        "text"
    }
}
