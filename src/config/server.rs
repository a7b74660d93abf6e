pub const PORT: u16 = 8080;
pub const BIND_ADDR: [u8; 4] = [0, 0, 0, 0];
pub const DB_PATH: &str = "price.db";
pub const QUOTE_ROUTE: &str = "/cotacao";
