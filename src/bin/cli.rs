use std::io::{self, Write};

use chrono::{NaiveDate, NaiveDateTime};
use homework_planner::calendar::{self, parse_date_key, parse_weekday, weekday_name};
use homework_planner::persistence::load_active_user;
use homework_planner::{
    ClassRecord, DayClassification, DayType, HomeworkItem, Planner, PlannerConfig, ScheduleSettings,
    ScheduleType, UserKey, load_homework_from_csv, load_ledger_from_json, save_homework_to_csv,
    save_ledger_to_json,
};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  today [date]                           Rotation, classes and homework due today/tomorrow\n  day <date>                             Classification, classes and homework of one day\n  override <date> <a|b|none>             Force or clear a day's rotation\n  settings                               Show rotation settings\n  settings <start_date> <a|b> [weekends] Set rotation anchor\n  settings clear                         Remove rotation settings\n  class list\n  class add <everyday|a-day|b-day> <days_csv|-> <color> <name...>\n  class delete <id|#>\n  hw list\n  hw add <class_id|#|-> <due> <title...>  Due is YYYY-MM-DD or YYYY-MM-DDTHH:MM\n  hw done <id|#>                         Toggle completion\n  hw delete <id|#>\n  hw sub <id|#> <title...>               Add a subtask\n  hw note <id|#> <text...>\n  due [today|tomorrow] [date]\n  streak [date]\n  nudge [date]\n  focus <minutes> [homework id|#]        Record a completed study session\n  progress [date]\n  month <year> <month>\n  login <user> | logout                  Switch whose ledger is loaded\n  reset                                  Erase the current user's records\n  export <json|csv> <path>\n  import <json|csv> <path>\n  quit|exit                              Exit"
    );
}

fn parse_day(input: Option<&str>) -> Result<NaiveDate, String> {
    match input {
        Some(raw) => parse_date_key(raw).ok_or_else(|| format!("Invalid date '{raw}' (YYYY-MM-DD)")),
        None => Ok(calendar::today_local()),
    }
}

fn parse_due(raw: &str) -> Option<NaiveDateTime> {
    calendar::parse_instant(raw)
}

/// Accepts a full id or a 1-based position in the current listing.
fn resolve_homework(planner: &Planner, token: &str) -> Option<String> {
    if planner.find_homework(token).is_some() {
        return Some(token.to_string());
    }
    let index: usize = token.trim_start_matches('#').parse().ok()?;
    planner
        .homework()
        .get(index.checked_sub(1)?)
        .map(|item| item.id.clone())
}

fn resolve_class(planner: &Planner, token: &str) -> Option<String> {
    if planner.find_class(token).is_some() {
        return Some(token.to_string());
    }
    let index: usize = token.trim_start_matches('#').parse().ok()?;
    planner
        .classes()
        .get(index.checked_sub(1)?)
        .map(|class| class.id.clone())
}

fn describe_class(class: &ClassRecord) -> String {
    let days = if class.days_of_week.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = class.days_of_week.iter().map(|day| weekday_name(*day)).collect();
        format!(" on {}", names.join(", "))
    };
    format!("{} [{}{}] {}", class.name, class.schedule_type, days, class.color)
}

fn describe_homework(planner: &Planner, item: &HomeworkItem) -> String {
    let class = planner
        .class_for(item)
        .map(|class| class.name.as_str())
        .unwrap_or("no class");
    let (done, total) = item.subtask_progress();
    let subtasks = if total > 0 {
        format!(" ({done}/{total} subtasks)")
    } else {
        String::new()
    };
    format!(
        "[{}] {} ({}) due {}{}",
        if item.is_complete { "x" } else { " " },
        item.title,
        class,
        item.due_date.format("%Y-%m-%d %H:%M"),
        subtasks
    )
}

fn print_homework_list(planner: &Planner, items: &[&HomeworkItem]) {
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  - {}", describe_homework(planner, item));
    }
}

fn print_day(planner: &Planner, date: NaiveDate) {
    let classification = planner.classify(date);
    let label = match classification {
        DayClassification::None => "no school rotation".to_string(),
        other => format!("{}-day", other.as_str().to_ascii_uppercase()),
    };
    let forced = if planner.get_override(date).is_some() {
        " (override)"
    } else {
        ""
    };
    println!("{} ({}): {}{}", date, calendar::weekday_name(chrono::Datelike::weekday(&date)), label, forced);
    println!("Classes:");
    let classes = planner.classes_scheduled_on(date);
    if classes.is_empty() {
        println!("  (none)");
    }
    for class in classes {
        println!("  - {}", describe_class(class));
    }
    println!("Homework:");
    print_homework_list(planner, &planner.homework_on(date));
}

fn handle_settings(planner: &mut Planner, args: &[&str]) {
    match args {
        [] => match planner.settings() {
            Some(settings) => println!(
                "Rotation starts {} as {}-day, weekends {}.",
                settings.start_date,
                settings.start_day_type.as_str().to_ascii_uppercase(),
                if settings.include_weekends { "included" } else { "skipped" }
            ),
            None => println!("No rotation configured."),
        },
        ["clear"] => {
            planner.set_schedule_settings(None);
            println!("Rotation settings cleared.");
        }
        [start, kind, rest @ ..] => {
            let Some(start_date) = parse_date_key(start) else {
                println!("Invalid date (YYYY-MM-DD)");
                return;
            };
            let Ok(start_day_type) = kind.parse::<DayType>() else {
                println!("Day type must be a or b");
                return;
            };
            let include_weekends = matches!(rest.first(), Some(&"weekends"));
            planner.set_schedule_settings(Some(ScheduleSettings::new(start_date, start_day_type, include_weekends)));
            println!("Rotation settings saved.");
        }
        _ => println!("Usage: settings [<start_date> <a|b> [weekends] | clear]"),
    }
}

fn handle_class(planner: &mut Planner, args: &[&str]) {
    match args {
        [] | ["list"] => {
            if planner.classes().is_empty() {
                println!("No classes.");
            }
            for (index, class) in planner.classes().iter().enumerate() {
                println!("{}. {} ({})", index + 1, describe_class(class), class.id);
            }
        }
        ["add", kind, days, color, name @ ..] if !name.is_empty() => {
            let Ok(schedule_type) = kind.parse::<ScheduleType>() else {
                println!("Schedule type must be everyday, a-day or b-day");
                return;
            };
            let mut weekdays = Vec::new();
            if *days != "-" {
                for part in days.split(',') {
                    match parse_weekday(part) {
                        Some(day) => weekdays.push(day),
                        None => {
                            println!("Invalid weekday '{part}'");
                            return;
                        }
                    }
                }
            }
            match planner.add_class(&name.join(" "), color, schedule_type, weekdays) {
                Ok(class) => println!("Added class {} ({}).", class.name, class.id),
                Err(e) => println!("Error: {e}"),
            }
        }
        ["delete", token] => match resolve_class(planner, token) {
            Some(id) if planner.delete_class(&id) => println!("Deleted class {id}."),
            _ => println!("Class {token} not found."),
        },
        _ => println!("Usage: class list | class add <type> <days_csv|-> <color> <name...> | class delete <id>"),
    }
}

fn handle_homework(planner: &mut Planner, args: &[&str]) {
    match args {
        [] | ["list"] => {
            if planner.homework().is_empty() {
                println!("No homework.");
            }
            for (index, item) in planner.homework().iter().enumerate() {
                println!("{}. {}", index + 1, describe_homework(planner, item));
            }
        }
        ["add", class, due, title @ ..] if !title.is_empty() => {
            let class_id = if *class == "-" {
                String::new()
            } else {
                match resolve_class(planner, class) {
                    Some(id) => id,
                    None => {
                        println!("Class {class} not found.");
                        return;
                    }
                }
            };
            let Some(due_date) = parse_due(due) else {
                println!("Invalid due date '{due}'");
                return;
            };
            let item = HomeworkItem::draft(title.join(" "), class_id, due_date);
            let title = item.title.clone();
            match planner.add_or_update_homework(item) {
                Ok(()) => println!("Added homework '{title}'."),
                Err(e) => println!("Error: {e}"),
            }
        }
        ["done", token] => match resolve_homework(planner, token) {
            Some(id) if planner.toggle_complete(&id) => {
                let state = planner
                    .find_homework(&id)
                    .map(|item| if item.is_complete { "complete" } else { "open" })
                    .unwrap_or("unknown");
                println!("Homework marked {state}.");
            }
            _ => println!("Homework {token} not found."),
        },
        ["delete", token] => match resolve_homework(planner, token) {
            Some(id) if planner.delete_homework(&id) => println!("Deleted homework {id}."),
            _ => println!("Homework {token} not found."),
        },
        ["sub", token, title @ ..] if !title.is_empty() => {
            let title = title.join(" ");
            let updated = resolve_homework(planner, token)
                .is_some_and(|id| planner.edit_homework(&id, |item| {
                    item.add_subtask(&title);
                }));
            if updated {
                println!("Subtask added.");
            } else {
                println!("Homework {token} not found.");
            }
        }
        ["note", token, text @ ..] => {
            let text = text.join(" ");
            let updated = resolve_homework(planner, token)
                .is_some_and(|id| planner.edit_homework(&id, |item| item.notes = text));
            if updated {
                println!("Notes saved.");
            } else {
                println!("Homework {token} not found.");
            }
        }
        _ => println!("Usage: hw list | hw add <class|-> <due> <title...> | hw done|delete <id> | hw sub|note <id> <text...>"),
    }
}

fn handle_export(planner: &Planner, args: &[&str]) {
    match args {
        ["json", path] => match save_ledger_to_json(planner.ledger(), path) {
            Ok(()) => println!("Ledger exported to {path}."),
            Err(e) => println!("Export error: {e}"),
        },
        ["csv", path] => match save_homework_to_csv(planner.homework(), path) {
            Ok(()) => println!("Homework exported to {path}."),
            Err(e) => println!("Export error: {e}"),
        },
        _ => println!("Usage: export <json|csv> <path>"),
    }
}

fn handle_import(planner: &mut Planner, args: &[&str]) {
    match args {
        ["json", path] => match load_ledger_from_json(path) {
            Ok(ledger) => match planner.replace_ledger(ledger) {
                Ok(()) => println!("Ledger imported from {path}."),
                Err(e) => println!("Import error: {e}"),
            },
            Err(e) => println!("Import error: {e}"),
        },
        ["csv", path] => match load_homework_from_csv(path) {
            Ok(items) => {
                let count = items.len();
                for item in items {
                    if let Err(e) = planner.add_or_update_homework(item) {
                        println!("Import error: {e}");
                        return;
                    }
                }
                println!("Imported {count} homework items from {path}.");
            }
            Err(e) => println!("Import error: {e}"),
        },
        _ => println!("Usage: import <json|csv> <path>"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homework_planner=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = PlannerConfig::from_env()?;
    let store = config.open_store()?;
    let user = match config.user_key() {
        UserKey::Guest => load_active_user(store.as_ref()).unwrap_or(UserKey::Guest),
        user => user,
    };
    let mut planner = Planner::open(store, user);

    println!("Homework Planner (CLI) - type 'help' for commands");
    println!("Signed in as {}.\n", planner.profile().name);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let words: Vec<&str> = input.split_whitespace().collect();
        let (cmd, args) = match words.split_first() {
            Some((cmd, args)) => (*cmd, args),
            None => continue,
        };

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "today" => match parse_day(args.first().copied()) {
                Ok(today) => {
                    print_day(&planner, today);
                    println!("Due today:");
                    print_homework_list(&planner, &planner.homework_due_today(today));
                    println!("Due tomorrow:");
                    print_homework_list(&planner, &planner.homework_due_tomorrow(today));
                }
                Err(e) => println!("{e}"),
            },
            "day" => match args.first().copied() {
                Some(raw) => match parse_day(Some(raw)) {
                    Ok(date) => print_day(&planner, date),
                    Err(e) => println!("{e}"),
                },
                None => println!("Usage: day <YYYY-MM-DD>"),
            },
            "override" => match args {
                [date, kind] => {
                    let Some(date) = parse_date_key(date) else {
                        println!("Invalid date (YYYY-MM-DD)");
                        continue;
                    };
                    let Ok(kind) = kind.parse::<DayClassification>() else {
                        println!("Override must be a, b or none");
                        continue;
                    };
                    planner.set_override(date, kind);
                    println!("{} is now {}.", date, planner.classify(date));
                }
                _ => println!("Usage: override <YYYY-MM-DD> <a|b|none>"),
            },
            "settings" => handle_settings(&mut planner, args),
            "class" => handle_class(&mut planner, args),
            "hw" => handle_homework(&mut planner, args),
            "due" => {
                let (tomorrow, date_arg) = match args {
                    ["tomorrow", rest @ ..] => (true, rest.first().copied()),
                    ["today", rest @ ..] => (false, rest.first().copied()),
                    rest => (false, rest.first().copied()),
                };
                match parse_day(date_arg) {
                    Ok(today) if tomorrow => {
                        println!("Due tomorrow:");
                        print_homework_list(&planner, &planner.homework_due_tomorrow(today));
                    }
                    Ok(today) => {
                        println!("Due today:");
                        print_homework_list(&planner, &planner.homework_due_today(today));
                    }
                    Err(e) => println!("{e}"),
                }
            }
            "streak" => match parse_day(args.first().copied()) {
                Ok(today) => println!("Completion streak: {} days", planner.completion_streak(today)),
                Err(e) => println!("{e}"),
            },
            "nudge" => match parse_day(args.first().copied()) {
                Ok(today) => match planner.upcoming_nudge(today, &mut rand::rng()) {
                    Some(message) => println!("{message}"),
                    None => println!("Nothing due in the next few days."),
                },
                Err(e) => println!("{e}"),
            },
            "focus" => {
                let Some(Ok(minutes)) = args.first().map(|raw| raw.parse::<u32>()) else {
                    println!("Usage: focus <minutes> [homework id|#]");
                    continue;
                };
                let homework_id = match args.get(1) {
                    Some(token) => match resolve_homework(&planner, token) {
                        Some(id) => Some(id),
                        None => {
                            println!("Homework {token} not found.");
                            continue;
                        }
                    },
                    None => None,
                };
                match planner.record_session(homework_id.as_deref(), calendar::now_local(), minutes) {
                    Ok(session) => println!("Recorded {} minute study session.", session.duration_minutes),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "progress" => match parse_day(args.first().copied()) {
                Ok(today) => {
                    let summary = planner.progress(today);
                    println!("Progress ({})", summary.to_cli_summary());
                    for item in &summary.recent_completed {
                        println!("  - {}", describe_homework(&planner, item));
                    }
                }
                Err(e) => println!("{e}"),
            },
            "month" => {
                let (Some(Ok(year)), Some(Ok(month))) = (
                    args.first().map(|raw| raw.parse::<i32>()),
                    args.get(1).map(|raw| raw.parse::<u32>()),
                ) else {
                    println!("Usage: month <year> <month>");
                    continue;
                };
                let cells = planner.month_view(year, month, calendar::today_local());
                if cells.is_empty() {
                    println!("Invalid month.");
                    continue;
                }
                println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
                for week in cells.chunks(7) {
                    let row: Vec<String> = week
                        .iter()
                        .map(|cell| {
                            if !cell.in_month {
                                return "     ".to_string();
                            }
                            let kind = match cell.classification {
                                DayClassification::A => 'A',
                                DayClassification::B => 'B',
                                DayClassification::None => ' ',
                            };
                            let due = if cell.homework_due > 0 { '*' } else { ' ' };
                            format!("{:>3}{}{}", chrono::Datelike::day(&cell.date), kind, due)
                        })
                        .collect();
                    println!("{}", row.join(""));
                }
            }
            "login" => match args.first() {
                Some(user) => {
                    planner.switch_user(UserKey::from_login(Some(*user)));
                    println!("Signed in as {}.", planner.user());
                }
                None => println!("Usage: login <user>"),
            },
            "logout" => {
                planner.logout();
                println!("Signed out; guest mode.");
            }
            "reset" => {
                planner.reset();
                println!("All records for {} erased.", planner.user());
            }
            "export" => handle_export(&planner, args),
            "import" => handle_import(&mut planner, args),
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
