pub const COTACAO_URL: &str = "http://localhost:8080/cotacao";
pub const CLIENT_BUDGET_MS: u64 = 300;
pub const COTACAO_FILE: &str = "cotacao.txt";
pub const BID_LABEL: &str = "Dólar";
