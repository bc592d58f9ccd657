use std::process::ExitCode;

use dotenv::dotenv;
use human_panic::setup_panic;
use serde::Serialize;
use tracing::{debug, info};

// 从 lib.rs 导入模块
use setukpa::config::AppConfig;
use setukpa::errors::{Result, SetukpaError};
use setukpa::models::users::entities::{Principal, UserRole};
use setukpa::runtime::lifetime;

const USAGE: &str = "用法: setukpa <migrate | audit | status <student_id> | score <paper_id>>";

/// 命令行子命令，只做只读报表
enum Command {
    Migrate,
    Audit,
    Status(i64),
    Score(i64),
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let name = args
            .next()
            .ok_or_else(|| SetukpaError::validation(USAGE))?;
        let mut id = |label: &str| -> Result<i64> {
            args.next()
                .ok_or_else(|| SetukpaError::validation(format!("缺少参数 <{label}>\n{USAGE}")))?
                .parse::<i64>()
                .map_err(|e| SetukpaError::validation(format!("<{label}> 不是有效的 ID: {e}")))
        };

        match name.as_str() {
            "migrate" => Ok(Command::Migrate),
            "audit" => Ok(Command::Audit),
            "status" => Ok(Command::Status(id("student_id")?)),
            "score" => Ok(Command::Score(id("paper_id")?)),
            other => Err(SetukpaError::validation(format!(
                "未知命令: {other}\n{USAGE}"
            ))),
        }
    }
}

/// 迁移已在创建 sea_orm 存储时执行，这里只汇报结果
fn migrate_summary(backend: &str) -> String {
    if backend == "sea_orm" {
        "Database migrations applied".to_string()
    } else {
        format!("Storage backend '{backend}' has no schema, nothing to migrate")
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command) -> Result<()> {
    let startup = lifetime::startup::prepare_startup().await?;
    // 报表使用只读的辅助角色
    let operator = Principal::new(0, UserRole::Helper);

    let outcome = match command {
        Command::Migrate => {
            info!("{}", migrate_summary(&AppConfig::get().storage.backend));
            Ok(())
        }
        Command::Audit => {
            let service = startup.distribution_service();
            service
                .find_dangling_papers(&operator)
                .await
                .and_then(|dangling| print_json(&dangling))
        }
        Command::Status(student_id) => {
            let service = startup.distribution_service();
            service
                .list_student_assignments(&operator, student_id)
                .await
                .and_then(|entries| print_json(&entries))
        }
        Command::Score(paper_id) => {
            let service = startup.grade_service();
            service
                .final_score(&operator, paper_id)
                .await
                .and_then(|score| print_json(&score))
        }
    };

    lifetime::shutdown::shutdown(startup).await;
    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    // 记录程序启动时间
    let start = chrono::Utc::now();

    setup_panic!();
    if let Err(e) = AppConfig::init() {
        eprintln!("{}", SetukpaError::from(e).format_colored());
        return ExitCode::FAILURE;
    }
    let config = AppConfig::get();

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e.format_simple());
            return ExitCode::from(2);
        }
    };

    debug!(
        "{} {} ({}) starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.system_name
    );

    let result = run(command).await;

    debug!(
        "Finished in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start)
            .num_milliseconds()
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        Command::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(parse(&["migrate"]), Ok(Command::Migrate)));
        assert!(matches!(parse(&["score", "7"]), Ok(Command::Score(7))));
        assert!(matches!(
            parse(&["status"]),
            Err(SetukpaError::Validation(_))
        ));
        assert!(matches!(
            parse(&["score", "abc"]),
            Err(SetukpaError::Validation(_))
        ));
        assert!(matches!(parse(&["drop"]), Err(SetukpaError::Validation(_))));
    }

    #[test]
    fn test_migrate_summary_depends_on_backend() {
        assert_eq!(migrate_summary("sea_orm"), "Database migrations applied");

        let memory = migrate_summary("memory");
        assert!(memory.contains("'memory'"));
        assert!(memory.contains("nothing to migrate"));
    }
}
