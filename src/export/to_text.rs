use crate::data_loader::Dataset;
use crate::snapshot::Snapshot;
use std::error::Error;

pub fn render(dataset: &Dataset, snapshot: &Snapshot) -> Result<String, Box<dyn Error>> {
    super::renderer::render_template(dataset, snapshot, &get_template())
}

pub fn get_template() -> String {
    let template = r##"{{#each rows as |row|}}
=== Row {{row.index}}{{#if row.classification}} [{{row.classification}}]{{/if}}
{{#each row.messages as |msg|}}
{{#if msg.from_user}}USER{{else}}BOT{{/if}}: {{msg.text}}
{{#each msg.feedbacks as |fb|}}
  -> {{fb.reaction}} ({{fb.method}}): {{fb.comment}}
{{/each}}
{{/each}}
{{/each}}
Positive: {{totals.positive}}
Negative: {{totals.negative}}
"##;

    template.to_string()
}
