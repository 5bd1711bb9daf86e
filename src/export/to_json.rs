use crate::data_loader::Dataset;
use crate::snapshot::Snapshot;
use std::error::Error;

pub fn render(dataset: &Dataset, snapshot: &Snapshot) -> Result<String, Box<dyn Error>> {
    let context = super::renderer::create_standard_context(dataset, snapshot);
    Ok(serde_json::to_string_pretty(&context)?)
}
