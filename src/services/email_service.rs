use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::email_template::EmailTemplate;

/// Manages the stored templates and renders them for delivery. There is no
/// mail transport: a send renders the template and logs the result.
#[derive(Clone)]
pub struct EmailService {
    pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Substitutes `{{key}}` placeholders from the variable map. Placeholders
/// without a matching key are left intact.
pub fn render_template(text: &str, variables: &HashMap<String, String>) -> String {
    let mut rendered = text.to_string();
    for (key, value) in variables {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }
    rendered
}

impl EmailService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<EmailTemplate>> {
        let templates = sqlx::query_as::<_, EmailTemplate>(
            "SELECT id, name, subject, body, created_at, updated_at
             FROM email_templates
             ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<EmailTemplate> {
        let template = sqlx::query_as::<_, EmailTemplate>(
            "SELECT id, name, subject, body, created_at, updated_at
             FROM email_templates
             WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        template.ok_or_else(|| Error::NotFound(format!("Email template {:?} not found", name)))
    }

    pub async fn update(&self, name: &str, subject: &str, body: &str) -> Result<EmailTemplate> {
        let template = sqlx::query_as::<_, EmailTemplate>(
            "UPDATE email_templates
             SET subject = $2, body = $3, updated_at = NOW()
             WHERE name = $1
             RETURNING id, name, subject, body, created_at, updated_at",
        )
        .bind(name)
        .bind(subject)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?;
        template.ok_or_else(|| Error::NotFound(format!("Email template {:?} not found", name)))
    }

    pub async fn send(
        &self,
        name: &str,
        recipient: &str,
        variables: &HashMap<String, String>,
    ) -> Result<RenderedEmail> {
        let template = self.get_by_name(name).await?;
        let rendered = RenderedEmail {
            subject: render_template(&template.subject, variables),
            body: render_template(&template.body, variables),
        };

        info!(
            template = %name,
            recipient = %recipient,
            subject = %rendered.subject,
            "email rendered for delivery"
        );

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_known_placeholder() {
        let mut vars = HashMap::new();
        vars.insert("user_name".to_string(), "Ada".to_string());
        vars.insert("course_title".to_string(), "Rust Basics".to_string());

        let rendered = render_template(
            "Dear {{user_name}}, welcome to {{course_title}}! Bye, {{user_name}}.",
            &vars,
        );
        assert_eq!(rendered, "Dear Ada, welcome to Rust Basics! Bye, Ada.");
    }

    #[test]
    fn unknown_placeholders_stay_intact() {
        let mut vars = HashMap::new();
        vars.insert("user_name".to_string(), "Ada".to_string());

        let rendered = render_template("{{user_name}}: {{certificate_number}}", &vars);
        assert_eq!(rendered, "Ada: {{certificate_number}}");
    }

    #[test]
    fn empty_map_changes_nothing() {
        let rendered = render_template("No {{placeholders}} here", &HashMap::new());
        assert_eq!(rendered, "No {{placeholders}} here");
    }
}
