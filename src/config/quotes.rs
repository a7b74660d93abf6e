pub const QUOTE_API_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";
pub const QUOTE_PAIR: &str = "USDBRL";
pub const FETCH_BUDGET_MS: u64 = 200;
pub const PERSIST_BUDGET_MS: u64 = 10;
/// Budget used by the fault-injection persist policy.
pub const FAULT_INJECTION_BUDGET_NS: u64 = 1;
