/// Symbols analyzed when none are configured.
pub const DEFAULT_SYMBOLS: [&str; 15] = [
    "AAPL", "MSFT", "TSLA", "BABA", "SAP", "NESN.SW", "AMZN", "TM", "SHEL", "NFLX", "ASML",
    "SIE.DE", "NVO", "TCS.NS", "SHOP",
];

/// Pause between symbols, in seconds.
pub const DEFAULT_SYMBOL_DELAY_SECS: u64 = 5;

/// Days of daily history fetched and kept per symbol.
pub const DEFAULT_HISTORY_DAYS: usize = 30;

/// Answers not refreshed for this many days are pruned.
pub const DEFAULT_ANSWER_RETENTION_DAYS: i64 = 30;

/// Snapshots older than this many days are pruned.
pub const DEFAULT_SNAPSHOT_RETENTION_DAYS: i64 = 7;
