use crate::data_loader::Dataset;
use crate::plan::CustomExportProfile;
use crate::snapshot::Snapshot;
use std::error::Error;
use std::fs;
use tracing::error;

pub fn render(
    dataset: &Dataset,
    snapshot: &Snapshot,
    params: &CustomExportProfile,
) -> Result<String, Box<dyn Error>> {
    let mut handlebars = crate::common::get_handlebars();

    if let Some(partials) = &params.partials {
        for (name, partial) in partials {
            let partial_content = fs::read_to_string(partial)?;

            if let Err(err) = handlebars.register_partial(name, partial_content) {
                error!("Failed to register partial: {}", err);
            }
        }
    }

    let template = fs::read_to_string(&params.template)?;
    let context = super::renderer::create_standard_context(dataset, snapshot);
    let rendered = handlebars.render_template(&template, &context)?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_custom_template_sees_standard_context() {
        let mut template = tempfile::NamedTempFile::new().unwrap();
        write!(
            template,
            "{{{{totals.positive}}}}/{{{{totals.negative}}}}"
        )
        .unwrap();

        let content = json!({
            "activities": [
                {"id": "m1", "type": "message", "timestamp": 1,
                 "from": {"role": 0}, "text": "hi"},
                {"id": "f1", "type": "invoke", "name": "message/submitAction", "timestamp": 2,
                 "value": {"actionName": "feedback", "replyToId": "m1",
                           "actionValue": {"reaction": "dislike"}}}
            ]
        })
        .to_string();
        let dataset = Dataset::from_contents(vec![Some(content)]);
        let snapshot = Snapshot::build(&dataset);

        let params = CustomExportProfile {
            template: template.path().to_str().unwrap().to_string(),
            partials: None,
        };
        let rendered = render(&dataset, &snapshot, &params).unwrap();
        assert_eq!(rendered, "0/1");
    }
}
