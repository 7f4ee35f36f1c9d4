//! Question categories.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::auth::MessageResponse;
use crate::api::{de_id, path_segment};
use crate::http::{ApiError, ApiRequest};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CategoryName {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryChange {
    category: Category,
}

/// Category listing (any role) and management (admin only).
pub struct CategoryApi<'a> {
    session: &'a SessionStore,
}

impl<'a> CategoryApi<'a> {
    #[must_use]
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    /// All categories ordered by name.
    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        self.session.send(ApiRequest::get("/question-categories")).await
    }

    pub async fn create(&self, name: &str) -> Result<Category, ApiError> {
        let body = CategoryName {
            name: name.trim().to_string(),
        };
        body.validate()?;
        let change: CategoryChange = self
            .session
            .send(ApiRequest::post("/admin/question-categories").with_json(&body)?)
            .await?;
        Ok(change.category)
    }

    pub async fn rename(&self, category_id: &str, name: &str) -> Result<Category, ApiError> {
        let id = path_segment(category_id)?;
        let body = CategoryName {
            name: name.trim().to_string(),
        };
        body.validate()?;
        let change: CategoryChange = self
            .session
            .send(ApiRequest::put(format!("/admin/question-categories/{id}")).with_json(&body)?)
            .await?;
        Ok(change.category)
    }

    /// Delete a category. The backend refuses while questions still use it.
    pub async fn delete(&self, category_id: &str) -> Result<MessageResponse, ApiError> {
        let id = path_segment(category_id)?;
        self.session
            .send(ApiRequest::delete(format!("/admin/question-categories/{id}")))
            .await
    }
}
