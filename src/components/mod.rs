pub mod cotacao;
pub mod persister;
pub mod quotes;
