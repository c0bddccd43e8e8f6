//! Command palette entries and autocomplete

use crate::crm::EntityKind;

/// What a command does once submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  /// Open an entity list as the new root view
  Open(EntityKind),
  /// Drop cached regions/countries and fetch them again
  ReloadMasterData,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "leads",
    aliases: &["l", "lead"],
    description: "Sales leads",
    action: CommandAction::Open(EntityKind::Leads),
  },
  Command {
    name: "clients",
    aliases: &["c", "client", "accounts"],
    description: "Client accounts",
    action: CommandAction::Open(EntityKind::Clients),
  },
  Command {
    name: "opportunities",
    aliases: &["o", "opp", "opps"],
    description: "Sales pipeline",
    action: CommandAction::Open(EntityKind::Opportunities),
  },
  Command {
    name: "sows",
    aliases: &["s", "sow"],
    description: "Statements of work",
    action: CommandAction::Open(EntityKind::Sows),
  },
  Command {
    name: "partners",
    aliases: &["p", "partner", "vendors"],
    description: "Partners and vendors",
    action: CommandAction::Open(EntityKind::Partners),
  },
  Command {
    name: "employees",
    aliases: &["e", "users", "staff"],
    description: "Users and employees",
    action: CommandAction::Open(EntityKind::Employees),
  },
  Command {
    name: "reload-master",
    aliases: &["rm", "master"],
    description: "Refresh regions and countries",
    action: CommandAction::ReloadMasterData,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit crmview",
    action: CommandAction::Quit,
  },
];

/// Rank of `cmd` for `input` (lower is better), or None when it doesn't match
fn rank(cmd: &Command, input: &str) -> Option<u8> {
  let aliases = || cmd.aliases.iter();
  if cmd.name == input {
    Some(0)
  } else if aliases().any(|a| *a == input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if aliases().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if aliases().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

/// Autocomplete suggestions for `input`, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(u8, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (r, cmd)))
    .collect();
  // Stable, so equal ranks keep declaration order
  ranked.sort_by_key(|(r, _)| *r);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

/// Resolve a command by exact name or alias
pub fn find(name: &str) -> Option<&'static Command> {
  let name = name.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == name || cmd.aliases.contains(&name.as_str()))
}
