//! Client-side shapes of the backend's REST resources
//!
//! Entities are owned by the backend; the client only holds transient
//! copies. Request payloads carry client-side validation so obviously bad
//! input never reaches the network.

pub mod analytics;
pub mod auth;
pub mod budget;
pub mod category;
pub mod category_rule;
pub mod decimal;
pub mod ids;
pub mod money;
pub mod statement;
pub mod transaction;
pub mod user;

pub use analytics::{AnalyticsRange, AnalyticsSummary, CategoryAnalytics, MonthlyData};
pub use auth::{AuthTokens, LoginRequest, RegisterRequest};
pub use budget::{Budget, BudgetMonth, BudgetUpdate, NewBudget};
pub use category::{find_category, Category, CategoryUpdate, NewCategory};
pub use category_rule::{CategoryRule, CategoryRuleUpdate, NewCategoryRule};
pub use ids::{BudgetId, CategoryId, CategoryRuleId, TransactionId, UserId};
pub use money::Money;
pub use statement::{ParsedTransaction, UploadResult};
pub use transaction::{
    CategoryRef, ListResponse, NewTransaction, Page, Transaction, TransactionFilter,
    TransactionKind, TransactionUpdate,
};
pub use user::{ProfileUpdate, User};
