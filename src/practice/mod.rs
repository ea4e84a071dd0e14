pub mod kind;
pub mod question;
pub mod root;
pub mod split;
