pub mod account;
pub mod activity_id;
pub mod comment;
pub mod content;
pub mod login;
pub mod moderation;
pub mod post;
pub mod signup;
pub mod verification;
