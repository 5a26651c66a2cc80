use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::Endpoints;
use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::map::{MapView, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::model::{field_label, Field, NewEmployee};
use crate::output::{self, OutputFormat};
use crate::query::{
    FuzzyMatcher, PageView, SortDirection, ViewState, DEFAULT_PAGE_SIZE, DEFAULT_THRESHOLD,
};
use crate::runner::{
    Options, Runner, RunnerError, WatchEvent, WatchUpdate, DEFAULT_REFRESH_INTERVAL,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::store::ApplyOutcome;
use crate::utils::{self, Logger};

const DEFAULT_MAP_OUTPUT: &str = "./employees-map.html";

#[derive(Clone, Debug)]
struct RunConfig {
    verbose: u8,
    no_color: bool,
    options: Options,
    action: Action,
}

#[derive(Clone, Debug)]
enum Action {
    List(ListConfig),
    Map(MapConfig),
    Add(AddConfig),
    InitConfig { path: PathBuf },
}

#[derive(Clone, Debug)]
struct ListConfig {
    view: ViewState,
    format: OutputFormat,
    interactive: bool,
    output: Option<String>,
    output_format: OutputFormat,
}

#[derive(Clone, Debug)]
struct MapConfig {
    output: String,
    format: OutputFormat,
    watch: bool,
}

#[derive(Clone, Debug)]
struct AddConfig {
    form: NewEmployee,
    prompt: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_endpoints(args: &CliArgs, cfg: &ConfigFile) -> Result<Endpoints, String> {
    let base = non_empty(args.base_url.clone().or_else(|| cfg.base_url.clone()));
    let mut endpoints = match base {
        Some(base) => Endpoints::from_base(&base).map_err(|e| e.to_string())?,
        None => Endpoints::default(),
    };
    if let Some(url) = non_empty(args.activation_url.clone().or_else(|| cfg.activation_url.clone())) {
        endpoints.activation = url;
    }
    if let Some(url) = non_empty(args.employees_url.clone().or_else(|| cfg.employees_url.clone())) {
        endpoints.employees = url;
    }
    if let Some(url) = non_empty(
        args.add_employee_url
            .clone()
            .or_else(|| cfg.add_employee_url.clone()),
    ) {
        endpoints.add_employee = url;
    }
    endpoints.validate().map_err(|e| e.to_string())?;
    Ok(endpoints)
}

fn parse_format(raw: &str, flag: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(raw).ok_or_else(|| format!("invalid {flag} '{raw}'"))
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let timeout_seconds = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
    if timeout_seconds == 0 {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }
    let proxy = non_empty(args.proxy.clone().or_else(|| cfg.proxy.clone()));
    let endpoints = build_endpoints(&args, &cfg)?;

    let list_args = match &args.command {
        Command::List(list) => Some(list.clone()),
        _ => None,
    };
    let page_size = list_args
        .as_ref()
        .and_then(|l| l.page_size)
        .or(cfg.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }
    let search_threshold = list_args
        .as_ref()
        .and_then(|l| l.threshold)
        .or(cfg.search_threshold)
        .unwrap_or(DEFAULT_THRESHOLD);
    let search_threshold = utils::parse_threshold(search_threshold)
        .map_err(|e| format!("invalid search_threshold: {e}"))?;

    let interval_seconds = match &args.command {
        Command::Map(map) => map.interval,
        _ => None,
    }
    .or(cfg.refresh_interval);
    let refresh_interval = match interval_seconds {
        Some(0) => return Err("invalid refresh_interval, expected positive seconds".to_string()),
        Some(secs) => Duration::from_secs(secs),
        None => DEFAULT_REFRESH_INTERVAL,
    };

    let options = Options {
        endpoints,
        timeout_seconds,
        proxy,
        page_size,
        search_threshold,
        refresh_interval,
    };

    let action = match args.command {
        Command::List(list) => {
            let mut view = ViewState::new(page_size);
            if let Some(query) = list.query.as_deref() {
                view = view.with_query(query);
            }
            for key in utils::parse_sort_keys(&list.sort)? {
                view = view.with_sort(key);
            }
            if let Some(order) = list.order.as_deref() {
                view = view.with_sort_direction(utils::parse_direction(order)?);
            }
            if let Some(page) = list.page {
                view.page.page = page.max(1);
            }

            let format = match list.format.as_deref() {
                Some(raw) => parse_format(raw, "--format")?,
                None => OutputFormat::Text,
            };
            let output = non_empty(list.output.or(cfg.output)).map(|p| config::expand_tilde_string(&p));
            let output_format = match (list.format.as_deref(), cfg.output_format.as_deref()) {
                (Some(_), _) => format,
                (None, Some(raw)) => parse_format(raw, "output_format")?,
                (None, None) => output
                    .as_deref()
                    .and_then(output::infer_format_from_path)
                    .unwrap_or(format),
            };
            if output_format.is_map_format() {
                return Err("table output supports text or json only".to_string());
            }

            Action::List(ListConfig {
                view,
                format,
                interactive: list.interactive,
                output,
                output_format,
            })
        }
        Command::Map(map) => {
            let output = config::expand_tilde_string(
                non_empty(map.output.or(cfg.map_output))
                    .unwrap_or_else(|| DEFAULT_MAP_OUTPUT.to_string())
                    .as_str(),
            );
            let format = match map.format.as_deref() {
                Some(raw) => parse_format(raw, "--format")?,
                None => output::infer_format_from_path(&output)
                    .map(|f| match f {
                        OutputFormat::Json => OutputFormat::GeoJson,
                        other => other,
                    })
                    .filter(|f| f.is_map_format())
                    .unwrap_or(OutputFormat::Html),
            };
            Action::Map(MapConfig {
                output,
                format,
                watch: map.watch,
            })
        }
        Command::Add(add) => {
            let mut form = NewEmployee::default();
            for (key, value) in add.provided() {
                form.set(key, value.trim()).map_err(|e| e.to_string())?;
            }
            Action::Add(AddConfig {
                form,
                prompt: add.prompt,
            })
        }
        Command::InitConfig { path } => {
            let path = match path {
                Some(p) => config::expand_tilde(&p),
                None => config::default_config_path()
                    .ok_or_else(|| "could not determine home directory".to_string())?,
            };
            Action::InitConfig { path }
        }
    };

    Ok(RunConfig {
        verbose: args.verbose,
        no_color,
        options,
        action,
    })
}

/// One line typed into the interactive table.
#[derive(Clone, Debug, PartialEq)]
enum SessionCommand {
    Show,
    Next,
    Previous,
    GoTo(usize),
    Sort(Field),
    Order(SortDirection),
    Search(String),
    Refresh,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if let Some(query) = line.strip_prefix('/') {
            return Ok(SessionCommand::Search(query.trim().to_string()));
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match head.to_lowercase().as_str() {
            "" => Ok(SessionCommand::Show),
            "n" | "next" => Ok(SessionCommand::Next),
            "p" | "prev" | "previous" => Ok(SessionCommand::Previous),
            "g" | "page" => rest
                .parse::<usize>()
                .map(SessionCommand::GoTo)
                .map_err(|_| format!("expected a page number, got '{rest}'")),
            "s" | "sort" => Field::parse_sort_key(rest).map(SessionCommand::Sort),
            "o" | "order" => rest.parse::<SortDirection>().map(SessionCommand::Order),
            "r" | "refresh" => Ok(SessionCommand::Refresh),
            "h" | "help" | "?" => Ok(SessionCommand::Help),
            "q" | "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(format!("unknown command '{other}', type h for help")),
        }
    }
}

const SESSION_HELP: &str = "\
  n | next          next page
  p | prev          previous page
  g N               go to page N
  s KEY             sort by KEY (again to flip direction)
  o asc|desc        set sort direction
  /TEXT             search, / alone clears
  r                 refetch from the API
  q                 quit";

/// Pure view transition for a navigation command; other commands leave it as is.
fn apply_session_command(state: &ViewState, command: &SessionCommand, matched: usize) -> ViewState {
    match command {
        SessionCommand::Next => state.next_page(matched),
        SessionCommand::Previous => state.previous_page(matched),
        SessionCommand::GoTo(page) => state.go_to_page(*page, matched),
        SessionCommand::Sort(key) => state.with_sort(*key),
        SessionCommand::Order(direction) => state.with_sort_direction(*direction),
        SessionCommand::Search(query) => state.with_query(query.clone()),
        SessionCommand::Show
        | SessionCommand::Refresh
        | SessionCommand::Help
        | SessionCommand::Quit => state.clone(),
    }
}

async fn write_output(path: &str, contents: &[u8]) -> Result<(), RunnerError> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|source| RunnerError::OutputWrite {
            path: path.to_string(),
            source,
        })?;
    outfile
        .write_all(contents)
        .await
        .map_err(|source| RunnerError::OutputWrite {
            path: path.to_string(),
            source,
        })
}

/// Writes map renders from a background task so the watch loop never blocks
/// on file I/O. Renders queued while a write is running collapse to the newest.
struct MapWriter {
    path: String,
    renders: mpsc::UnboundedSender<Vec<u8>>,
    task: JoinHandle<Result<usize, RunnerError>>,
}

impl MapWriter {
    fn spawn(path: String) -> Self {
        let (renders, mut queue) = mpsc::unbounded_channel::<Vec<u8>>();
        let target = path.clone();
        let task = tokio::spawn(async move {
            let mut written = 0usize;
            while let Some(mut contents) = queue.recv().await {
                while let Ok(newer) = queue.try_recv() {
                    contents = newer;
                }
                write_output(&target, &contents).await?;
                written += 1;
            }
            Ok::<_, RunnerError>(written)
        });
        Self {
            path,
            renders,
            task,
        }
    }

    fn submit(&self, contents: Vec<u8>) -> Result<(), RunnerError> {
        self.renders
            .send(contents)
            .map_err(|_| RunnerError::OutputClosed {
                path: self.path.clone(),
            })
    }

    /// Flushes queued renders and returns how many writes reached the file.
    async fn finish(self) -> Result<usize, RunnerError> {
        drop(self.renders);
        self.task
            .await
            .map_err(|source| RunnerError::TaskJoin { source })?
    }
}

fn render_page(view: &PageView, format: OutputFormat) -> Result<Vec<u8>, String> {
    match format {
        OutputFormat::Json => {
            output::render_json(view).map_err(|e| RunnerError::from(e).to_string())
        }
        _ => Ok(output::render_table(view).into_bytes()),
    }
}

fn write_stdout(contents: &[u8]) -> Result<(), String> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(contents)
        .and_then(|_| stdout.flush())
        .map_err(|e| format!("failed to write to stdout: {e}"))
}

/// One fetch cycle behind a spinner. Errors leave the store as it was.
async fn fetch_with_spinner(runner: &mut Runner, logger: &Logger) -> Result<usize, RunnerError> {
    let pb = match utils::spinner("loading employees") {
        Ok(pb) => Some(pb),
        Err(e) => {
            logger.debug(e);
            None
        }
    };
    let result = runner.refresh().await;
    if let Some(pb) = pb.as_ref() {
        pb.finish_and_clear();
    }
    match result? {
        ApplyOutcome::Applied { generation, count } => {
            logger.info(format!("loaded {count} employees (fetch #{generation})"));
            Ok(count)
        }
        ApplyOutcome::Stale { generation, current } => {
            logger.warn(format!(
                "discarded stale response #{generation}, showing #{current}"
            ));
            Ok(runner.store().len())
        }
    }
}

async fn run_list(runner: &mut Runner, cfg: ListConfig, logger: &Logger) -> Result<(), String> {
    logger.kv(
        "Table",
        &format!(
            "query={} sort={} {} page={} size={} threshold={}",
            utils::format_opt_value(&cfg.view.search, "none"),
            cfg.view.sort.key,
            cfg.view.sort.direction,
            cfg.view.page.page,
            cfg.view.page.page_size,
            runner.options().search_threshold,
        ),
    );

    fetch_with_spinner(runner, logger)
        .await
        .map_err(|e| e.to_string())?;

    if cfg.interactive {
        return run_session(runner, cfg.view, logger).await;
    }

    let view = runner.view(&cfg.view);
    if view.page != cfg.view.page.page {
        logger.warn(format!(
            "page {} is out of range, showing page {} of {}",
            cfg.view.page.page, view.page, view.total_pages
        ));
    }
    write_stdout(&render_page(&view, cfg.format)?)?;

    if let Some(path) = cfg.output.as_deref() {
        let contents = render_page(&view, cfg.output_format)?;
        write_output(path, &contents)
            .await
            .map_err(|e| e.to_string())?;
        logger.ok(format!("wrote page {} to {path}", view.page));
    }
    Ok(())
}

async fn run_session(runner: &mut Runner, mut state: ViewState, logger: &Logger) -> Result<(), String> {
    let matcher = runner.matcher();
    state = clamp_to_records(&state, runner, &matcher);
    print_session_view(runner, &state, &matcher)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write_stdout(b"> ")?;
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read stdin: {e}")),
        };
        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                logger.error(e);
                continue;
            }
        };
        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => {
                println!("{SESSION_HELP}");
                continue;
            }
            SessionCommand::Refresh => {
                if let Err(e) = fetch_with_spinner(runner, logger).await {
                    logger.error(format!("refresh failed, keeping previous records: {e}"));
                }
                state = clamp_to_records(&state, runner, &matcher);
            }
            other => {
                let matched = state.matched(runner.store().records(), &matcher);
                state = apply_session_command(&state, &other, matched);
            }
        }
        print_session_view(runner, &state, &matcher)?;
    }
    Ok(())
}

/// Pulls the page back inside the current record count.
fn clamp_to_records(state: &ViewState, runner: &Runner, matcher: &FuzzyMatcher) -> ViewState {
    let matched = state.matched(runner.store().records(), matcher);
    state.go_to_page(state.page.page, matched)
}

fn print_session_view(runner: &Runner, state: &ViewState, matcher: &FuzzyMatcher) -> Result<(), String> {
    let view = state.render(runner.store().records(), matcher);
    let mut out = String::new();
    if !view.query.trim().is_empty() {
        out.push_str(&format!("Search: {}\n", view.query));
    }
    out.push_str(&output::render_table(&view));
    write_stdout(out.as_bytes())
}

/// Forwards stdin lines as watch events: `q` stops, anything else refreshes.
fn spawn_stdin_events(tx: mpsc::Sender<WatchEvent>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let event = match line.trim().to_lowercase().as_str() {
                "q" | "quit" | "exit" => WatchEvent::Stop,
                _ => WatchEvent::Refresh,
            };
            if tx.blocking_send(event).is_err() || event == WatchEvent::Stop {
                break;
            }
        }
    });
}

async fn run_map(runner: &mut Runner, cfg: MapConfig, logger: &Logger) -> Result<(), String> {
    logger.kv(
        "Map",
        &format!(
            "output={} format={:?} watch={} interval={}s",
            cfg.output,
            cfg.format,
            utils::format_bool(cfg.watch),
            runner.options().refresh_interval.as_secs(),
        ),
    );

    let mut map = MapView::mount(DEFAULT_CENTER, DEFAULT_ZOOM);

    if !cfg.watch {
        fetch_with_spinner(runner, logger)
            .await
            .map_err(|e| e.to_string())?;
        let summary = map.refresh(runner.store().records());
        let contents =
            output::render_map(&map, cfg.format).map_err(|e| RunnerError::from(e).to_string())?;
        write_output(&cfg.output, &contents)
            .await
            .map_err(|e| e.to_string())?;
        if summary.skipped > 0 {
            logger.warn(format!(
                "{} employees have no usable coordinates",
                summary.skipped
            ));
        }
        logger.ok(format!("wrote {} markers to {}", summary.added, cfg.output));
        map.unmount();
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<WatchEvent>(8);
    spawn_stdin_events(tx.clone());
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(WatchEvent::Stop).await;
        }
    });
    logger.ok(format!(
        "watching, map is rewritten every {}s; Enter refreshes now, q quits",
        runner.options().refresh_interval.as_secs()
    ));

    let writer = MapWriter::spawn(cfg.output.clone());
    let format = cfg.format;
    let result = runner
        .watch_map(&mut map, rx, |update| {
            match update {
                WatchUpdate::Refreshed {
                    generation,
                    summary,
                    map,
                } => {
                    writer.submit(output::render_map(map, format)?)?;
                    logger.ok(format!(
                        "refresh #{generation}: {} markers, {} replaced, {} without coordinates",
                        summary.added, summary.removed, summary.skipped
                    ));
                }
                WatchUpdate::Stale {
                    generation,
                    current,
                } => logger.warn(format!(
                    "discarded stale response #{generation}, map shows #{current}"
                )),
                WatchUpdate::Failed { generation, error } => logger.error(format!(
                    "refresh #{generation} failed, keeping previous markers: {error}"
                )),
            }
            Ok(())
        })
        .await;
    ctrl_c.abort();

    // a failed write ends the watch; report the I/O error rather than the closed queue
    let written = writer.finish().await.map_err(|e| e.to_string())?;
    let summary = result.map_err(|e| e.to_string())?;
    logger.kv(
        "Watch",
        &format!(
            "started={} applied={} stale={} failed={}",
            summary.started, summary.applied, summary.stale, summary.failed
        ),
    );
    let refreshes = map.refreshes();
    let markers = map.unmount();
    logger.debug(format!(
        "map unmounted with {} markers after {refreshes} refreshes, {written} writes",
        markers.len()
    ));
    Ok(())
}

async fn run_add(runner: &Runner, cfg: AddConfig, logger: &Logger) -> Result<(), String> {
    let mut form = cfg.form;
    if cfg.prompt {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        for key in form.missing() {
            write_stdout(format!("{}: ", field_label(key)).as_bytes())?;
            let value = lines
                .next_line()
                .await
                .map_err(|e| format!("failed to read stdin: {e}"))?
                .unwrap_or_default();
            form.set(key, value.trim()).map_err(|e| e.to_string())?;
        }
    }

    let missing = form.missing();
    if !missing.is_empty() {
        logger.debug(format!("missing fields: {}", missing.join(", ")));
    }

    let pb = utils::spinner("adding employee")?;
    let result = runner.add_employee(&form).await;
    pb.finish_and_clear();
    let response = result.map_err(|e| e.to_string())?;
    let message = response
        .message
        .unwrap_or_else(|| "employee added".to_string());
    logger.ok(message);
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    let logger = Logger::new(run.verbose);

    if let Action::InitConfig { path } = &run.action {
        if config::ensure_default_config_file(path)? {
            logger.ok(format!("wrote default config to {}", path.display()));
        } else {
            logger.warn(format!("config already exists at {}", path.display()));
        }
        return Ok(());
    }

    let endpoints = &run.options.endpoints;
    logger.kv(
        "API",
        &format!(
            "activation={} employees={} add={}",
            endpoints.activation, endpoints.employees, endpoints.add_employee
        ),
    );
    logger.kv(
        "HTTP",
        &format!(
            "timeout={}s proxy={}",
            run.options.timeout_seconds,
            if run.options.proxy.is_some() { "on" } else { "off" }
        ),
    );

    let mut runner = Runner::new(run.options.clone()).map_err(|e| e.to_string())?;
    match run.action {
        Action::List(cfg) => run_list(&mut runner, cfg, &logger).await,
        Action::Map(cfg) => run_map(&mut runner, cfg, &logger).await,
        Action::Add(cfg) => run_add(&runner, cfg, &logger).await,
        Action::InitConfig { .. } => Ok(()),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::Parser;

    fn list_config(run: RunConfig) -> ListConfig {
        match run.action {
            Action::List(cfg) => cfg,
            other => panic!("expected list action, got {other:?}"),
        }
    }

    #[test]
    fn list_defaults_match_the_table() {
        let args = CliArgs::parse_from(["staffscope", "list"]);
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        assert_eq!(run.options.page_size, 20);
        assert_eq!(run.options.search_threshold, 0.3);
        assert_eq!(run.options.refresh_interval, Duration::from_secs(30));
        assert_eq!(run.options.endpoints, Endpoints::default());
        let cfg = list_config(run);
        assert_eq!(cfg.view, ViewState::new(20));
        assert_eq!(cfg.format, OutputFormat::Text);
        assert!(!cfg.interactive);
    }

    #[test]
    fn cli_flags_override_config_values() {
        let args = CliArgs::parse_from(["staffscope", "list", "--page-size", "5"]);
        let cfg = ConfigFile {
            page_size: Some(50),
            search_threshold: Some(0.1),
            timeout: Some(3),
            ..ConfigFile::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(run.options.page_size, 5);
        assert_eq!(run.options.search_threshold, 0.1);
        assert_eq!(run.options.timeout_seconds, 3);
    }

    #[test]
    fn repeated_sort_flag_toggles_like_a_header_click() {
        let args = CliArgs::parse_from(["staffscope", "list", "-s", "city", "-s", "city"]);
        let view = list_config(build_run_config(args, ConfigFile::default()).unwrap()).view;
        assert_eq!(view.sort.key, Field::City);
        assert_eq!(view.sort.direction, SortDirection::Desc);

        let args = CliArgs::parse_from([
            "staffscope", "list", "-s", "country", "--order", "desc", "-q", "lahor", "-p", "3",
        ]);
        let view = list_config(build_run_config(args, ConfigFile::default()).unwrap()).view;
        assert_eq!(view.sort.key, Field::Country);
        assert_eq!(view.sort.direction, SortDirection::Desc);
        assert_eq!(view.search, "lahor");
        assert_eq!(view.page.page, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for argv in [
            vec!["staffscope", "list", "--page-size", "0"],
            vec!["staffscope", "list", "--threshold", "2"],
            vec!["staffscope", "list", "--sort", "salary"],
            vec!["staffscope", "list", "--format", "html"],
            vec!["staffscope", "map", "--interval", "0"],
            vec!["staffscope", "--base-url", "nope", "list"],
        ] {
            let args = CliArgs::parse_from(argv.clone());
            assert!(
                build_run_config(args, ConfigFile::default()).is_err(),
                "accepted {argv:?}"
            );
        }
    }

    #[test]
    fn base_url_and_endpoint_overrides() {
        let args = CliArgs::parse_from([
            "staffscope",
            "--base-url",
            "http://127.0.0.1:8080/api",
            "--add-url",
            "http://127.0.0.1:9000/create",
            "list",
        ]);
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        let endpoints = run.options.endpoints;
        assert_eq!(
            endpoints.activation,
            "http://127.0.0.1:8080/api/get_activation_code"
        );
        assert_eq!(
            endpoints.employees,
            "http://127.0.0.1:8080/api/get_all_employee"
        );
        assert_eq!(endpoints.add_employee, "http://127.0.0.1:9000/create");
    }

    #[test]
    fn map_format_follows_extension() {
        let args = CliArgs::parse_from(["staffscope", "map", "-o", "/tmp/staff.geojson"]);
        match build_run_config(args, ConfigFile::default()).unwrap().action {
            Action::Map(cfg) => {
                assert_eq!(cfg.format, OutputFormat::GeoJson);
                assert!(!cfg.watch);
            }
            other => panic!("unexpected {other:?}"),
        }

        let args = CliArgs::parse_from(["staffscope", "map", "--watch", "--interval", "5"]);
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        assert_eq!(run.options.refresh_interval, Duration::from_secs(5));
        match run.action {
            Action::Map(cfg) => {
                assert_eq!(cfg.output, DEFAULT_MAP_OUTPUT);
                assert_eq!(cfg.format, OutputFormat::Html);
                assert!(cfg.watch);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_flags_fill_the_form() {
        let args = CliArgs::parse_from([
            "staffscope",
            "add",
            "--first-name",
            "Sana",
            "--lat",
            "-33.9",
            "--phone",
            " 0300 ",
        ]);
        match build_run_config(args, ConfigFile::default()).unwrap().action {
            Action::Add(cfg) => {
                assert_eq!(cfg.form.first_name, "Sana");
                assert_eq!(cfg.form.latitude, "-33.9");
                assert_eq!(cfg.form.phone_number, "0300");
                assert!(cfg.form.missing().contains(&"lastName"));
                assert!(!cfg.prompt);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_color_from_config_unless_forced() {
        let cfg = ConfigFile {
            no_color: Some(true),
            ..ConfigFile::default()
        };
        let args = CliArgs::parse_from(["staffscope", "list"]);
        assert!(build_run_config(args, cfg.clone()).unwrap().no_color);
        let args = CliArgs::parse_from(["staffscope", "--color", "list"]);
        assert!(!build_run_config(args, cfg).unwrap().no_color);
    }

    #[test]
    fn session_commands_parse() {
        assert_eq!("n".parse::<SessionCommand>(), Ok(SessionCommand::Next));
        assert_eq!("".parse::<SessionCommand>(), Ok(SessionCommand::Show));
        assert_eq!("g 4".parse::<SessionCommand>(), Ok(SessionCommand::GoTo(4)));
        assert_eq!(
            "sort first_name".parse::<SessionCommand>(),
            Ok(SessionCommand::Sort(Field::FirstName))
        );
        assert_eq!(
            "/ lahor ".parse::<SessionCommand>(),
            Ok(SessionCommand::Search("lahor".to_string()))
        );
        assert_eq!("/".parse::<SessionCommand>(), Ok(SessionCommand::Search(String::new())));
        assert_eq!(
            "o desc".parse::<SessionCommand>(),
            Ok(SessionCommand::Order(SortDirection::Desc))
        );
        assert!("s lng".parse::<SessionCommand>().is_err());
        assert!("sort latitude".parse::<SessionCommand>().is_err());
        assert!("g x".parse::<SessionCommand>().is_err());
        assert!("jump".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn session_transitions_stay_in_bounds() {
        let state = ViewState::new(20);
        let state = apply_session_command(&state, &SessionCommand::Previous, 45);
        assert_eq!(state.page.page, 1);
        let state = apply_session_command(&state, &SessionCommand::GoTo(9), 45);
        assert_eq!(state.page.page, 3);
        let state = apply_session_command(&state, &SessionCommand::Next, 45);
        assert_eq!(state.page.page, 3);
        let state = apply_session_command(&state, &SessionCommand::Search("x".into()), 45);
        assert_eq!(state.page.page, 1);
        assert_eq!(state.search, "x");
        let state = apply_session_command(&state, &SessionCommand::Sort(Field::HiringTestId), 45);
        assert_eq!(state.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn start_page_past_the_end_steps_back_from_the_last_page() {
        let args = CliArgs::parse_from(["staffscope", "list", "-p", "10"]);
        let state = list_config(build_run_config(args, ConfigFile::default()).unwrap()).view;
        assert_eq!(state.page.page, 10);

        let back = apply_session_command(&state, &SessionCommand::Previous, 45);
        assert_eq!(back.page.page, 2);
        let back = apply_session_command(&back, &SessionCommand::Previous, 45);
        assert_eq!(back.page.page, 1);

        let clamped = state.go_to_page(state.page.page, 45);
        assert_eq!(clamped.page.page, 3);
        assert_eq!(
            apply_session_command(&clamped, &SessionCommand::Previous, 45).page.page,
            2
        );
    }

    #[tokio::test]
    async fn map_writer_keeps_the_newest_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.geojson").to_string_lossy().into_owned();
        let writer = MapWriter::spawn(path.clone());
        writer.submit(b"first".to_vec()).unwrap();
        writer.submit(b"second".to_vec()).unwrap();
        let written = writer.finish().await.unwrap();
        assert!((1..=2).contains(&written));
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn map_writer_reports_the_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("missing")
            .join("map.html")
            .to_string_lossy()
            .into_owned();
        let writer = MapWriter::spawn(path);
        writer.submit(b"<html></html>".to_vec()).unwrap();
        let err = writer.finish().await.unwrap_err();
        assert!(matches!(err, RunnerError::OutputWrite { .. }));
    }
}
