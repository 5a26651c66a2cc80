use crate::cli::args::{CliArgs, Command};
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    let urls = [
        ("--base-url", args.base_url.as_deref()),
        ("--activation-url", args.activation_url.as_deref()),
        ("--employees-url", args.employees_url.as_deref()),
        ("--add-url", args.add_employee_url.as_deref()),
        ("--proxy", args.proxy.as_deref()),
    ];
    for (flag, raw) in urls {
        if let Some(raw) = raw {
            crate::utils::parse_url(raw).map_err(|e| format!("invalid {flag} '{raw}': {e}"))?;
        }
    }

    match &args.command {
        Command::List(list) => {
            if let Some(size) = list.page_size {
                if size == 0 {
                    return Err("invalid page-size, expected positive integer".to_string());
                }
            }
            if let Some(threshold) = list.threshold {
                crate::utils::parse_threshold(threshold)
                    .map_err(|e| format!("invalid --threshold: {e}"))?;
            }
            crate::utils::parse_sort_keys(&list.sort)
                .map_err(|e| format!("invalid --sort: {e}"))?;
            if let Some(raw) = list.order.as_deref() {
                crate::utils::parse_direction(raw)?;
            }
            if let Some(raw) = list.format.as_deref() {
                match OutputFormat::parse(raw) {
                    Some(OutputFormat::Text) | Some(OutputFormat::Json) => {}
                    _ => return Err(format!("invalid --format '{raw}', expected text or json")),
                }
            }
            if list.interactive && list.format.as_deref().map(OutputFormat::parse)
                == Some(Some(OutputFormat::Json))
            {
                return Err("--interactive only supports the text format".to_string());
            }
        }
        Command::Map(map) => {
            if let Some(interval) = map.interval {
                if interval == 0 {
                    return Err("invalid interval, expected positive number of seconds".to_string());
                }
            }
            if let Some(raw) = map.format.as_deref() {
                match OutputFormat::parse(raw) {
                    Some(format) if format.is_map_format() => {}
                    _ => return Err(format!("invalid --format '{raw}', expected html or geojson")),
                }
            }
        }
        Command::Add(_) | Command::InitConfig { .. } => {}
    }
    Ok(())
}
