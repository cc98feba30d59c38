use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// `RUST_LOG` 未設定時使用的過濾規則
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "birthday_greeter=debug,info"
    } else {
        "birthday_greeter=info"
    }
}

/// 初始化日誌；`json` 為 true 時輸出 JSON 給日誌收集，否則為精簡的終端格式
pub fn init_logger(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let output = fmt::layer().with_target(false);
    let output = if json {
        output.json().boxed()
    } else {
        output.compact().boxed()
    };

    tracing_subscriber::registry().with(filter).with(output).init();
}
