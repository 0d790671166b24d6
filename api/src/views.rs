//! Askama page templates and the view models they render.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use shared::entity::strategies;
use shared::models::{format_thousands, py_float, Indicator, Operator, StrategyInput, StrategyParams};
use shared::GeneratedStrategy;

use crate::auth::UserView;
use crate::error::AppError;

/// Render a page, turning template failures into a 500.
pub fn render<T: Template>(page: &T) -> Result<Response, AppError> {
    Ok(Html(page.render()?).into_response())
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub fn indicator_options(current: &str) -> Vec<SelectOption> {
    let current = current.parse::<Indicator>().ok();
    Indicator::ALL
        .iter()
        .map(|i| SelectOption {
            value: i.as_str(),
            label: i.label(),
            selected: current == Some(*i),
        })
        .collect()
}

pub fn operator_options(current: &str) -> Vec<SelectOption> {
    let current = current.parse::<Operator>().ok();
    Operator::ALL
        .iter()
        .map(|o| SelectOption {
            value: o.as_str(),
            label: o.label(),
            selected: current == Some(*o),
        })
        .collect()
}

/// A stored strategy as shown to its owner, in pages and in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyView {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub indicator: String,
    pub operator: String,
    pub value: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub capital: f64,
    pub strategy_name: String,
    pub generated_code: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl StrategyView {
    pub fn value_display(&self) -> String {
        py_float(self.value)
    }

    pub fn stop_loss_display(&self) -> String {
        py_float(self.stop_loss)
    }

    pub fn target_display(&self) -> String {
        py_float(self.target)
    }

    pub fn capital_display(&self) -> String {
        format_thousands(self.capital)
    }

    pub fn created_display(&self) -> String {
        self.created_at.get(..16).unwrap_or(&self.created_at).replace('T', " ")
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

impl From<&strategies::Model> for StrategyView {
    fn from(model: &strategies::Model) -> Self {
        let strategy_name = match StrategyParams::try_from(model) {
            Ok(params) => params.strategy_name(),
            Err(e) => {
                tracing::warn!("Strategy {} has unreadable parameters: {}", model.id, e);
                model.name.clone()
            }
        };
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name.clone(),
            description: model.description.clone(),
            indicator: model.indicator.clone(),
            operator: model.operator.clone(),
            value: model.value,
            stop_loss: model.stop_loss,
            target: model.target,
            capital: model.capital,
            strategy_name,
            generated_code: model.generated_code.clone(),
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub app_name: String,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub app_name: String,
    pub user: Option<UserView>,
    pub username: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub app_name: String,
    pub user: Option<UserView>,
    pub username: String,
    pub email: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub app_name: String,
    pub user: Option<UserView>,
    pub strategies: Vec<StrategyView>,
    pub total: u64,
    pub limit: u64,
    pub query: String,
    pub message: Option<String>,
    pub message_type: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "builder.html")]
pub struct BuilderPage {
    pub app_name: String,
    pub user: Option<UserView>,
    pub form: StrategyInput,
    pub indicators: Vec<SelectOption>,
    pub operators: Vec<SelectOption>,
    pub errors: Vec<String>,
    pub generated: Option<GeneratedStrategy>,
}

impl BuilderPage {
    pub fn new(app_name: &str, user: UserView, form: StrategyInput) -> Self {
        Self {
            app_name: app_name.to_string(),
            user: Some(user),
            indicators: indicator_options(&form.indicator),
            operators: operator_options(&form.operator),
            form,
            errors: Vec::new(),
            generated: None,
        }
    }
}

#[derive(Template)]
#[template(path = "strategy_view.html")]
pub struct StrategyViewPage {
    pub app_name: String,
    pub user: Option<UserView>,
    pub strategy: StrategyView,
}

#[derive(Template)]
#[template(path = "strategy_edit.html")]
pub struct StrategyEditPage {
    pub app_name: String,
    pub user: Option<UserView>,
    pub strategy_id: i32,
    pub form: StrategyInput,
    pub indicators: Vec<SelectOption>,
    pub operators: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl StrategyEditPage {
    pub fn new(app_name: &str, user: UserView, strategy_id: i32, form: StrategyInput) -> Self {
        Self {
            app_name: app_name.to_string(),
            user: Some(user),
            strategy_id,
            indicators: indicator_options(&form.indicator),
            operators: operator_options(&form.operator),
            form,
            errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_mark_current_selection() {
        let options = indicator_options("bollinger_bands");
        assert_eq!(options.len(), 8);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.value == "Bollinger_Bands"));

        assert!(operator_options("").iter().all(|o| !o.selected));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = ErrorPage {
            status: 404,
            title: "Not Found".to_string(),
            message: "<script>".to_string(),
        };
        let html = page.render().unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
