use anyhow::Result;
use colored::Colorize;
use stackup_core::config::CONFIG_FILE;
use stackup_core::StackConfig;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};

struct CheckResult {
    passed: bool,
    message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

fn check_config(root: &Path) -> (CheckResult, Option<StackConfig>) {
    let label = if root.join(CONFIG_FILE).exists() {
        format!("{} found and valid", CONFIG_FILE)
    } else {
        format!("{} not found (using defaults)", CONFIG_FILE)
    };
    match StackConfig::load_with_env(root) {
        Ok(config) => {
            let message = format!("{}, environment: {}", label, config.environment.active);
            (CheckResult::pass(message), Some(config))
        }
        Err(e) => (CheckResult::fail(format!("Config error: {:#}", e)), None),
    }
}

fn check_dir(role: &str, path: &Path) -> CheckResult {
    if path.is_dir() {
        CheckResult::pass(format!("{} directory {}", role, path.display()))
    } else {
        CheckResult::fail(format!("{} directory {} not found", role, path.display()))
    }
}

fn check_log_writable(path: &Path) -> CheckResult {
    let Some(parent) = path.parent().filter(|p| p.is_dir()) else {
        return CheckResult::fail(format!("Log {} has no directory to live in", path.display()));
    };
    // Open without truncating so an existing backend log survives the check.
    let existed = path.exists();
    let probe = OpenOptions::new().append(true).create(true).open(path);
    match probe {
        Ok(_) => {
            if !existed {
                let _ = std::fs::remove_file(path);
            }
            CheckResult::pass(format!("Log {} writable", path.display()))
        }
        Err(e) => CheckResult::fail(format!(
            "Log {} not writable in {}: {}",
            path.display(),
            parent.display(),
            e
        )),
    }
}

fn check_tool(role: &str, program: &str, dir: &Path) -> CheckResult {
    let mut cmd = Command::new(program);
    cmd.arg("--version").stdin(Stdio::null());
    if dir.is_dir() {
        cmd.current_dir(dir);
    }
    match cmd.output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let version = stdout
                .lines()
                .chain(stderr.lines())
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("unknown version");
            CheckResult::pass(format!("{} program `{}` ({})", role, program, version))
        }
        Ok(_) => CheckResult::fail(format!(
            "{} program `{}` found but `--version` returned an error",
            role, program
        )),
        Err(e) => CheckResult::fail(format!("{} program `{}` not runnable: {}", role, program, e)),
    }
}

pub fn run(root: &Path) -> Result<()> {
    println!("{}", "Stackup Doctor".bold());
    println!();

    // === Configuration ===
    println!("{}", "Configuration".bold().underline());
    let (config_check, config) = check_config(root);
    print_checks(std::slice::from_ref(&config_check));
    // Later sections still make sense against the defaults.
    let config = config.unwrap_or_default();

    // === Layout ===
    println!();
    println!("{}", "Project Layout".bold().underline());
    let backend_dir = config.backend_dir(root);
    let frontend_dir = config.frontend_dir(root);
    let layout_checks = vec![
        check_dir("Backend", &backend_dir),
        check_dir("Frontend", &frontend_dir),
        check_log_writable(&config.log_path(root)),
    ];
    print_checks(&layout_checks);

    // === Tools ===
    println!();
    println!("{}", "Programs".bold().underline());
    let tool_checks = vec![
        check_tool("Backend", &config.backend.program, &backend_dir),
        check_tool("Frontend", &config.frontend.program, &frontend_dir),
    ];
    print_checks(&tool_checks);

    // === Summary ===
    let all_checks: Vec<&CheckResult> = std::iter::once(&config_check)
        .chain(layout_checks.iter())
        .chain(tool_checks.iter())
        .collect();

    let total = all_checks.len();
    let passed = all_checks.iter().filter(|c| c.passed).count();
    let failed = total - passed;

    println!();
    let summary = format!("{}/{} checks passed", passed, total);
    if failed == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.yellow().bold());
        println!(
            "{}",
            format!("{} issue(s) found, see above for details", failed).yellow()
        );
    }

    Ok(())
}

fn print_checks(checks: &[CheckResult]) {
    for check in checks {
        if check.passed {
            println!("  {} {}", "\u{2713}".green(), check.message);
        } else {
            println!("  {} {}", "\u{2717}".red(), check.message);
        }
    }
}
