use crate::{config::Config, home, journal::Journal, store::Store, validation, Args};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::io::{self, Write};

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub store: RefCell<Store>,
    pub journal: RefCell<Option<Journal>>,
    pub session_id: String,
}

/// Result of handling one line of input
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Output(String),
    Exit,
}

/// Answers a yes/no question; the REPL asks on the terminal
pub type Confirm<'a> = &'a mut dyn FnMut(&str) -> bool;

pub fn run_once(ctx: &Context, command: &str) -> Result<()> {
    let print_mode = true;
    let mut confirm = |question: &str| ask_yes_no(question, print_mode, ctx.args.yes);
    if let Step::Output(text) = handle_line(ctx, command, &mut confirm)? {
        print!("{}", text);
    }
    Ok(())
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut confirm = |question: &str| ask_yes_no(question, false, ctx.args.yes);

    println!("dayplan - type /help for commands, /exit to quit");
    if let Some(name) = ctx.store.borrow().current_user() {
        println!("Welcome back, {}!", name);
    }

    loop {
        match rl.readline(&ctx.config.prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;

                // Activity text is kept verbatim, trailing spaces included
                match handle_line(&ctx, &line, &mut confirm) {
                    Ok(Step::Output(text)) => print!("{}", text),
                    Ok(Step::Exit) => break,
                    Err(e) => eprintln!("Error: {:#}", e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn ask_yes_no(question: &str, print_mode: bool, auto_yes: bool) -> bool {
    if auto_yes {
        return true;
    }
    // No terminal to ask on in -c mode
    if print_mode {
        eprintln!("{} denied - use --yes with -c", question);
        return false;
    }

    print!("{} [y/N] ", question);
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        let input = input.trim().to_lowercase();
        input == "y" || input == "yes"
    } else {
        false
    }
}

/// Handle one line: a slash command, or plain text which is added as an activity
pub fn handle_line(ctx: &Context, line: &str, confirm: Confirm) -> Result<Step> {
    let command = line.trim_start();
    if !command.starts_with('/') {
        return Ok(Step::Output(add_activity(ctx, line)?));
    }
    let line = command;

    let parts: Vec<&str> = line.splitn(2, ' ').collect();
    let rest = if parts.len() > 1 { parts[1] } else { "" };

    let out = match parts[0] {
        "/exit" | "/quit" => return Ok(Step::Exit),
        "/help" => help_text(),
        "/signup" | "/register" => signup(ctx, rest)?,
        "/login" => login(ctx, rest)?,
        "/logout" => logout(ctx)?,
        "/add" => add_activity(ctx, rest)?,
        "/rm" | "/remove" => remove_activity(ctx, rest, confirm)?,
        "/list" => match ctx.store.borrow().current_activities() {
            Ok(activities) => home::render_activities(activities),
            Err(_) => login_required(),
        },
        "/home" => match ctx.store.borrow().current_user() {
            Some(name) => render_home(ctx, name),
            None => login_required(),
        },
        "/whoami" => match ctx.store.borrow().current_user() {
            Some(name) => format!("Logged in as {}\n", name),
            None => "Not logged in\n".to_string(),
        },
        "/session" => {
            let journal = ctx.journal.borrow();
            let mut out = format!("Session: {}\n", ctx.session_id);
            if let Some(j) = journal.as_ref() {
                out.push_str(&format!("Journal: {}\n", j.path.display()));
            }
            out.push_str(&format!("Storage: {}\n", ctx.config.storage.as_str()));
            let store = ctx.store.borrow();
            out.push_str(&format!("Users: {}\n", store.users().len()));
            out.push_str(&format!(
                "Authenticated: {}\n",
                if store.is_authenticated() { "yes" } else { "no" }
            ));
            out
        }
        _ => format!("Unknown command: {}\n", parts[0]),
    };
    Ok(Step::Output(out))
}

fn help_text() -> String {
    [
        "Commands:",
        "  /signup <user> <password> <confirm> - create an account",
        "  /login <user> <password>            - log in",
        "  /logout                             - log out",
        "  /add <activity>                     - add an activity (or just type it)",
        "  /rm <activity>                      - remove every matching activity",
        "  /list                               - list your activities",
        "  /home                               - show the home screen",
        "  /whoami                             - show who is logged in",
        "  /session                            - show session info",
        "  /help                               - show commands",
        "  /exit                               - quit",
        "",
    ]
    .join("\n")
}

fn login_required() -> String {
    "Please log in first (/login <user> <password>)\n".to_string()
}

fn render_home(ctx: &Context, username: &str) -> String {
    let store = ctx.store.borrow();
    let now = chrono::Local::now().naive_local();
    home::render(
        username,
        store.list_activities(username),
        &now,
        &ctx.config.home,
    )
}

/// Split form arguments shell-style so quoted values may contain spaces.
/// Missing trailing fields come back empty.
fn form_args(rest: &str, n: usize) -> Result<Vec<String>, String> {
    let mut args = shell_words::split(rest).map_err(|e| format!("Invalid arguments: {}\n", e))?;
    args.resize(n.max(args.len()), String::new());
    Ok(args)
}

fn journal(ctx: &Context, f: impl FnOnce(&mut Journal) -> Result<()>) {
    if let Some(j) = ctx.journal.borrow_mut().as_mut() {
        if let Err(e) = f(j) {
            tracing::warn!(error = %e, "failed to write journal");
        }
    }
}

fn signup(ctx: &Context, rest: &str) -> Result<String> {
    if let Some(name) = ctx.store.borrow().current_user() {
        return Ok(format!("Already logged in as {}\n", name));
    }
    let args = match form_args(rest, 3) {
        Ok(args) => args,
        Err(msg) => return Ok(msg),
    };
    let (username, password, confirm) = (&args[0], &args[1], &args[2]);
    if let Err(e) = validation::check_signup(username, password, confirm) {
        return Ok(format!("{}\n", e));
    }

    let ok = ctx.store.borrow_mut().register(username, password)?;
    journal(ctx, |j| j.register(username, ok));
    if ok {
        Ok("Registration successful! Please log in.\n".to_string())
    } else {
        Ok("Username already exists\n".to_string())
    }
}

fn login(ctx: &Context, rest: &str) -> Result<String> {
    if let Some(name) = ctx.store.borrow().current_user() {
        return Ok(format!("Already logged in as {}\n", name));
    }
    let args = match form_args(rest, 2) {
        Ok(args) => args,
        Err(msg) => return Ok(msg),
    };
    let (username, password) = (&args[0], &args[1]);
    if let Err(e) = validation::check_login(username, password) {
        return Ok(format!("{}\n", e));
    }

    let ok = ctx.store.borrow_mut().login(username, password)?;
    journal(ctx, |j| j.login(username, ok));
    if ok {
        Ok(render_home(ctx, username))
    } else {
        Ok("Invalid username or password\n".to_string())
    }
}

fn logout(ctx: &Context) -> Result<String> {
    let previous = ctx.store.borrow().current_user().map(str::to_string);
    ctx.store.borrow_mut().logout()?;
    journal(ctx, |j| j.logout(previous.as_deref()));
    Ok("Logged out\n".to_string())
}

fn add_activity(ctx: &Context, text: &str) -> Result<String> {
    let Some(username) = ctx.store.borrow().current_user().map(str::to_string) else {
        return Ok(login_required());
    };
    if let Err(e) = validation::check_activity(text) {
        return Ok(format!("{}\n", e));
    }

    ctx.store.borrow_mut().add_current_activity(text)?;
    journal(ctx, |j| j.activity_added(&username, text));
    Ok(format!("Added: {}\n", text))
}

fn remove_activity(ctx: &Context, text: &str, confirm: Confirm) -> Result<String> {
    let Some(username) = ctx.store.borrow().current_user().map(str::to_string) else {
        return Ok(login_required());
    };
    if !ctx
        .store
        .borrow()
        .list_activities(&username)
        .iter()
        .any(|a| a == text)
    {
        return Ok(format!("No activity named '{}'\n", text));
    }
    if ctx.config.confirm_remove && !confirm(&format!("Remove '{}'?", text)) {
        return Ok("Kept\n".to_string());
    }

    let removed = ctx.store.borrow_mut().remove_current_activity(text)?;
    journal(ctx, |j| j.activity_removed(&username, text, removed));
    if removed > 1 {
        Ok(format!("Removed: {} ({} entries)\n", text, removed))
    } else {
        Ok(format!("Removed: {}\n", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use clap::Parser;
    use tempfile::TempDir;

    fn test_ctx(confirm_remove: bool) -> Context {
        let mut config = Config::default();
        config.confirm_remove = confirm_remove;
        Context {
            args: Args::parse_from(["dayplan", "--memory"]),
            config,
            store: RefCell::new(Store::open(Box::new(MemoryStore::new())).unwrap()),
            journal: RefCell::new(None),
            session_id: "test".to_string(),
        }
    }

    fn run(ctx: &Context, line: &str) -> String {
        let mut yes = |_: &str| true;
        match handle_line(ctx, line, &mut yes).unwrap() {
            Step::Output(text) => text,
            Step::Exit => "<exit>".to_string(),
        }
    }

    fn logged_in_ctx() -> Context {
        let ctx = test_ctx(false);
        run(&ctx, "/signup alice pw1 pw1");
        run(&ctx, "/login alice pw1");
        ctx
    }

    #[test]
    fn test_signup_messages() {
        let ctx = test_ctx(false);
        assert_eq!(
            run(&ctx, "/signup alice pw1 pw1"),
            "Registration successful! Please log in.\n"
        );
        assert_eq!(
            run(&ctx, "/signup alice pw2 pw2"),
            "Username already exists\n"
        );
        assert_eq!(run(&ctx, "/signup bob pw"), "All fields are required\n");
        assert_eq!(run(&ctx, "/signup bob pw px"), "Passwords do not match\n");
        assert_eq!(ctx.store.borrow().users().len(), 1);
    }

    #[test]
    fn test_signup_quoted_arguments() {
        let ctx = test_ctx(false);
        run(&ctx, r#"/signup "mary ann" "a b" "a b""#);
        assert!(ctx.store.borrow().users()[0].credentials_match("mary ann", "a b"));
        assert!(run(&ctx, r#"/signup "unterminated"#).starts_with("Invalid arguments"));
    }

    #[test]
    fn test_login_flow() {
        let ctx = test_ctx(false);
        run(&ctx, "/signup alice pw1 pw1");

        assert_eq!(
            run(&ctx, "/login alice"),
            "Please enter both username and password\n"
        );
        assert_eq!(
            run(&ctx, "/login alice nope"),
            "Invalid username or password\n"
        );
        assert!(run(&ctx, "/login alice pw1").starts_with("Hello alice!"));
        assert_eq!(run(&ctx, "/whoami"), "Logged in as alice\n");
        assert_eq!(
            run(&ctx, "/login alice pw1"),
            "Already logged in as alice\n"
        );
        assert_eq!(
            run(&ctx, "/signup bob pw pw"),
            "Already logged in as alice\n"
        );

        assert_eq!(run(&ctx, "/logout"), "Logged out\n");
        assert_eq!(run(&ctx, "/whoami"), "Not logged in\n");
    }

    #[test]
    fn test_activity_commands_need_login() {
        let ctx = test_ctx(false);
        let guard = login_required();
        assert_eq!(run(&ctx, "/add Run"), guard);
        assert_eq!(run(&ctx, "Run"), guard);
        assert_eq!(run(&ctx, "/rm Run"), guard);
        assert_eq!(run(&ctx, "/list"), guard);
        assert_eq!(run(&ctx, "/home"), guard);
    }

    #[test]
    fn test_add_and_remove_activities() {
        let ctx = logged_in_ctx();
        assert_eq!(run(&ctx, "/add Go for a run"), "Added: Go for a run\n");
        run(&ctx, "Read");
        run(&ctx, "Read");
        assert_eq!(run(&ctx, "/add    "), "Activity must not be empty\n");
        assert_eq!(
            ctx.store.borrow().list_activities("alice"),
            ["Go for a run", "Read", "Read"]
        );

        assert_eq!(run(&ctx, "/rm Read"), "Removed: Read (2 entries)\n");
        assert_eq!(run(&ctx, "/rm Read"), "No activity named 'Read'\n");
        assert!(run(&ctx, "/list").contains("1. Go for a run"));
    }

    #[test]
    fn test_trailing_whitespace_survives_add_and_remove() {
        let ctx = logged_in_ctx();
        assert_eq!(run(&ctx, "/add Run "), "Added: Run \n");
        assert_eq!(ctx.store.borrow().list_activities("alice"), ["Run "]);

        assert_eq!(run(&ctx, "/rm Run"), "No activity named 'Run'\n");
        assert_eq!(run(&ctx, "  /rm Run "), "Removed: Run \n");
        assert!(ctx.store.borrow().list_activities("alice").is_empty());
    }

    #[test]
    fn test_remove_asks_for_confirmation() {
        let ctx = test_ctx(true);
        run(&ctx, "/signup alice pw1 pw1");
        run(&ctx, "/login alice pw1");
        run(&ctx, "Run");

        let mut asked = Vec::new();
        let mut no = |q: &str| {
            asked.push(q.to_string());
            false
        };
        let step = handle_line(&ctx, "/rm Run", &mut no).unwrap();
        assert_eq!(step, Step::Output("Kept\n".to_string()));
        assert_eq!(asked, ["Remove 'Run'?"]);
        assert_eq!(ctx.store.borrow().list_activities("alice"), ["Run"]);

        assert_eq!(run(&ctx, "/rm Run"), "Removed: Run\n");
    }

    #[test]
    fn test_exit_and_unknown() {
        let ctx = test_ctx(false);
        assert_eq!(run(&ctx, "/exit"), "<exit>");
        assert_eq!(run(&ctx, "/quit"), "<exit>");
        assert_eq!(run(&ctx, "/bogus"), "Unknown command: /bogus\n");
        assert!(run(&ctx, "/help").contains("/signup"));
    }

    #[test]
    fn test_session_info() {
        let ctx = logged_in_ctx();
        let out = run(&ctx, "/session");
        assert!(out.starts_with("Session: test\n"));
        assert!(out.contains("Users: 1\n"));
        assert!(out.contains("Authenticated: yes\n"));
    }

    #[test]
    fn test_journal_records_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("j.jsonl");
        let ctx = test_ctx(false);
        *ctx.journal.borrow_mut() = Some(Journal::new(&path, "test").unwrap());

        run(&ctx, "/signup alice pw1 pw1");
        run(&ctx, "/login alice pw1");
        run(&ctx, "Run");
        run(&ctx, "/rm Run");
        run(&ctx, "/logout");

        let content = std::fs::read_to_string(&path).unwrap();
        let types: Vec<String> = content
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            types,
            ["register", "login", "activity_added", "activity_removed", "logout"]
        );
        assert!(!content.contains("pw1"));
    }
}
