//! Minimal text-entry form used by the sign-in, sign-up and upload views.

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    /// Rendered masked.
    pub secret: bool,
}

#[derive(Debug, Clone)]
pub struct TextForm {
    fields: Vec<Field>,
    focus: usize,
}

impl TextForm {
    pub fn new(labels: &[(&'static str, bool)]) -> Self {
        Self {
            fields: labels
                .iter()
                .map(|&(label, secret)| Field {
                    label,
                    value: String::new(),
                    secret,
                })
                .collect(),
            focus: 0,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn pop(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// Value of field `index`; non-secret fields are trimmed.
    pub fn value(&self, index: usize) -> &str {
        match self.fields.get(index) {
            Some(f) if f.secret => &f.value,
            Some(f) => f.value.trim(),
            None => "",
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.focus = 0;
    }
}
