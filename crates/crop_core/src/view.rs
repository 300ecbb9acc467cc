//! Pure mapping from form state to a view tree the host paints.

use crate::form::PredictionForm;

pub const TITLE: &str = "Crop Disease Prediction";
pub const SUBMIT_LABEL: &str = "Predict";
pub const RESULTS_HEADING: &str = "Prediction Results:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading(&'static str),
    Form {
        /// Name of the selected file, if any.
        file_name: Option<String>,
        submit_label: &'static str,
        /// Requests still waiting for an answer.
        pending: usize,
    },
    /// Shown in warning colours.
    Error(String),
    Results {
        heading: &'static str,
        fields: Vec<Field>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub nodes: Vec<Node>,
}

impl View {
    /// Plain-text copy of the results block, one `label: value` line per field.
    pub fn to_plain_text(&self) -> Option<String> {
        self.nodes.iter().find_map(|node| match node {
            Node::Results { fields, .. } => Some(
                fields
                    .iter()
                    .map(|f| format!("{}: {}", f.label, f.value))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        })
    }
}

pub fn render(form: &PredictionForm) -> View {
    let mut nodes = vec![
        Node::Heading(TITLE),
        Node::Form {
            file_name: form.selected().map(|f| f.file_name.clone()),
            submit_label: SUBMIT_LABEL,
            pending: form.in_flight(),
        },
    ];

    if let Some(message) = form.error() {
        nodes.push(Node::Error(message.to_string()));
    }

    if let Some(result) = form.result() {
        nodes.push(Node::Results {
            heading: RESULTS_HEADING,
            fields: vec![
                Field {
                    label: "Predicted Disease",
                    value: result.disease.clone(),
                },
                Field {
                    label: "Confidence",
                    value: result.confidence_percent(),
                },
                Field {
                    label: "Recommended Pesticides",
                    value: result.pesticides.clone(),
                },
                Field {
                    label: "Available at Shop",
                    value: result.shop.clone(),
                },
            ],
        });
    }

    View { nodes }
}
