use super::Services;
use crate::cli::app::HistoryArgs;
use anyhow::Result;
use codegen_core::history::HistoryRecord;

/// Print matching ledger records, most recent first
pub async fn execute(services: &Services, args: HistoryArgs) -> Result<()> {
    let records = if let Some(language) = &args.language {
        services.stats.history_by_language(language).await
    } else if let Some(keyword) = &args.search {
        services.stats.search_history(keyword).await
    } else {
        services.stats.recent_history(args.limit).await
    };

    if records.is_empty() {
        println!("No history records found");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_record(record));
    }
    Ok(())
}

fn format_record(record: &HistoryRecord) -> String {
    let status = if record.success { "ok" } else { "failed" };
    let mut line = format!(
        "#{:<5} {}  {:<12} {:>6}ms  {:<6}  {}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.programming_language,
        record.execution_time_ms,
        status,
        record.user_prompt.lines().next().unwrap_or_default(),
    );
    if let Some(error) = &record.error_message {
        line.push_str(&format!("\n        error: {error}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_failed_record() {
        let record = HistoryRecord {
            id: 7,
            user_prompt: "Parse JSON\nwith comments".to_string(),
            programming_language: "Rust".to_string(),
            generated_code: None,
            created_at: Utc::now(),
            execution_time_ms: 1200,
            success: false,
            error_message: Some("Generated code is empty or invalid".to_string()),
        };

        let line = format_record(&record);
        assert!(line.starts_with("#7 "));
        assert!(line.contains("failed"));
        assert!(line.contains("Parse JSON"));
        assert!(!line.contains("with comments"));
        assert!(line.contains("error: Generated code is empty or invalid"));
    }
}
