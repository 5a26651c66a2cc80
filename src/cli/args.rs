use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "staffscope",
    version,
    about = "search, sort, page and map employee records",
    long_about = "staffscope fetches the employee list from the hiring-test API and lets you search it (typo tolerant), sort it, page through it, plot it on a map and add new employees.\n\nExamples:\n  staffscope list -q lahor --sort city\n  staffscope list --interactive\n  staffscope map -o employees-map.html --watch\n  staffscope add --first-name Sana --last-name Iqbal ... \n\nTip: Use --config to persist API and paging settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.staffscope/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "base-url",
        value_name = "URL",
        global = true,
        help_heading = "API",
        help = "Base URL shared by the activation, list and add endpoints."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "activation-url",
        value_name = "URL",
        global = true,
        help_heading = "API",
        help = "Override the activation code endpoint."
    )]
    pub activation_url: Option<String>,

    #[arg(
        long = "employees-url",
        value_name = "URL",
        global = true,
        help_heading = "API",
        help = "Override the employee list endpoint."
    )]
    pub employees_url: Option<String>,

    #[arg(
        long = "add-url",
        value_name = "URL",
        global = true,
        help_heading = "API",
        help = "Override the add employee endpoint."
    )]
    pub add_employee_url: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        global = true,
        help_heading = "API",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "API",
        help = "Send requests through this proxy."
    )]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the employee table.
    List(ListArgs),
    /// Plot employee locations on a map page.
    Map(MapArgs),
    /// Create a new employee record.
    Add(AddArgs),
    /// Write a default config file.
    InitConfig {
        #[arg(value_name = "FILE", help = "Where to write it (defaults to ~/.staffscope/config.yml).")]
        path: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(
        short = 'q',
        long = "query",
        value_name = "TEXT",
        help_heading = "Table",
        help = "Fuzzy search across test ID, first name, last name, city and country."
    )]
    pub query: Option<String>,

    #[arg(
        short = 's',
        long = "sort",
        value_name = "KEY",
        action = ArgAction::Append,
        help_heading = "Table",
        help = "Sort by a field. Repeating the current key flips the direction, like clicking a column header (repeatable)."
    )]
    pub sort: Vec<String>,

    #[arg(
        long = "order",
        value_name = "asc|desc",
        help_heading = "Table",
        help = "Force the final sort direction."
    )]
    pub order: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Table",
        help = "Page to show (clamped to the available pages)."
    )]
    pub page: Option<usize>,

    #[arg(
        long = "page-size",
        value_name = "N",
        help_heading = "Table",
        help = "Rows per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 't',
        long = "threshold",
        value_name = "0.0-1.0",
        help_heading = "Table",
        help = "Fuzzy match threshold; lower is stricter."
    )]
    pub threshold: Option<f64>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Table",
        help = "Browse the table with commands read from stdin (n, p, s KEY, /TEXT, r, q)."
    )]
    pub interactive: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Also write the rendered page to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "format",
        value_name = "text|json",
        help_heading = "Output",
        help = "Output format."
    )]
    pub format: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MapArgs {
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Where to write the map (defaults to ./employees-map.html)."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "format",
        value_name = "html|geojson",
        help_heading = "Output",
        help = "Map format (inferred from the output extension when omitted)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'w',
        long = "watch",
        help_heading = "Map",
        help = "Keep refreshing the map; press Enter to refresh now, q to quit."
    )]
    pub watch: bool,

    #[arg(
        long = "interval",
        value_name = "SECS",
        help_heading = "Map",
        help = "Seconds between refreshes in watch mode."
    )]
    pub interval: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    #[arg(long = "first-name", value_name = "TEXT", help_heading = "Employee")]
    pub first_name: Option<String>,
    #[arg(long = "last-name", value_name = "TEXT", help_heading = "Employee")]
    pub last_name: Option<String>,
    #[arg(long = "email", value_name = "TEXT", help_heading = "Employee")]
    pub email: Option<String>,
    #[arg(long = "phone", visible_alias = "phone-number", value_name = "TEXT", help_heading = "Employee")]
    pub phone_number: Option<String>,
    #[arg(long = "employee-id", value_name = "TEXT", help_heading = "Employee")]
    pub employee_id: Option<String>,
    #[arg(long = "designation", value_name = "TEXT", help_heading = "Employee")]
    pub designation: Option<String>,
    #[arg(long = "city", value_name = "TEXT", help_heading = "Employee")]
    pub city: Option<String>,
    #[arg(long = "country", value_name = "TEXT", help_heading = "Employee")]
    pub country: Option<String>,
    #[arg(long = "latitude", visible_alias = "lat", value_name = "NUM", allow_hyphen_values = true, help_heading = "Employee")]
    pub latitude: Option<String>,
    #[arg(long = "longitude", visible_alias = "lng", value_name = "NUM", allow_hyphen_values = true, help_heading = "Employee")]
    pub longitude: Option<String>,

    #[arg(
        long = "prompt",
        help_heading = "Input",
        help = "Ask on stdin for any field not given as a flag."
    )]
    pub prompt: bool,
}

impl AddArgs {
    /// Flag values keyed by form field.
    pub fn provided(&self) -> Vec<(&'static str, &str)> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phoneNumber", &self.phone_number),
            ("employeeID", &self.employee_id),
            ("designation", &self.designation),
            ("city", &self.city),
            ("country", &self.country),
            ("latitude", &self.latitude),
            ("longitude", &self.longitude),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}
