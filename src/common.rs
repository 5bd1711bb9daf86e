use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_string_to_file(filename: &str, content: &str) -> std::io::Result<()> {
    let path = Path::new(filename);
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(exists: |v: Value| !v.is_null());
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(isnull: |v: Value| v.is_null());
    handlebars.register_helper("isnull", Box::new(isnull));

    handlebars_helper!(stringeq: |s1: String, s2: String| s1.eq(&s2));
    handlebars.register_helper("stringeq", Box::new(stringeq));

    handlebars
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handlebars_can_render() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template("row {{index}}: {{classification}}", &json!({"index": 3, "classification": "NEGATIVE"}))
            .expect("This to render");
        assert_eq!(res, "row 3: NEGATIVE");
    }

    #[test]
    fn handlebars_can_iterate_feedbacks() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#each feedbacks as |fb|}}
{{fb.reaction}} via {{fb.method}}
{{/each}}"#,
                &json!({"feedbacks": [
                    {"reaction": "like", "method": "ID"},
                    {"reaction": "dislike", "method": "TIME"}
                ]}),
            )
            .expect("This to render");
        assert_eq!(res, "like via ID\ndislike via TIME\n");
    }

    #[test]
    fn handlebars_helper_stringeq_can_render() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#if (stringeq "dislike" fb.reaction) }}
  {{fb.comment}};
{{/if}}"#,
                &json!({
                    "fb": {
                        "reaction": "dislike",
                        "comment": "wrong answer",
                    }
                }),
            )
            .expect("This to render");
        assert_eq!(res, "  wrong answer;\n");
    }

    #[test]
    fn handlebars_helper_isnull_can_render() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#if (isnull msg.timestamp) }}
  {{msg.text}};
{{/if}}"#,
                &json!({
                    "msg": {
                        "text": "hello"
                    }
                }),
            )
            .expect("This to render");
        assert_eq!(res, "  hello;\n");
    }
}
