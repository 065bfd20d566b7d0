mod budget;
mod category;
mod company;
mod transaction;
mod user;

pub use budget::{Budget, NewBudget};
pub use category::Category;
pub use company::Company;
pub use transaction::{NewTransaction, Transaction};
pub use user::User;
