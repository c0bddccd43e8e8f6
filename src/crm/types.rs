use super::columns;
use crate::grid::Column;

/// Entity collections exposed by the CRM backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Leads,
  Clients,
  Opportunities,
  Sows,
  Partners,
  Employees,
}

impl EntityKind {
  pub const ALL: [EntityKind; 6] = [
    EntityKind::Leads,
    EntityKind::Clients,
    EntityKind::Opportunities,
    EntityKind::Sows,
    EntityKind::Partners,
    EntityKind::Employees,
  ];

  /// Title shown in the header and breadcrumbs
  pub fn label(self) -> &'static str {
    match self {
      EntityKind::Leads => "Leads",
      EntityKind::Clients => "Clients",
      EntityKind::Opportunities => "Opportunities",
      EntityKind::Sows => "SOWs",
      EntityKind::Partners => "Partners",
      EntityKind::Employees => "Employees",
    }
  }

  /// Singular noun for confirmations and notifications
  pub fn singular(self) -> &'static str {
    match self {
      EntityKind::Leads => "lead",
      EntityKind::Clients => "client",
      EntityKind::Opportunities => "opportunity",
      EntityKind::Sows => "SOW",
      EntityKind::Partners => "partner",
      EntityKind::Employees => "employee",
    }
  }

  /// Command palette name
  pub fn command(self) -> &'static str {
    match self {
      EntityKind::Leads => "leads",
      EntityKind::Clients => "clients",
      EntityKind::Opportunities => "opportunities",
      EntityKind::Sows => "sows",
      EntityKind::Partners => "partners",
      EntityKind::Employees => "employees",
    }
  }

  /// REST collection path, relative to the backend base URL
  pub fn endpoint(self) -> &'static str {
    match self {
      EntityKind::Employees => "users",
      other => other.command(),
    }
  }

  pub fn columns(self) -> &'static [Column] {
    match self {
      EntityKind::Leads => columns::LEADS,
      EntityKind::Clients => columns::CLIENTS,
      EntityKind::Opportunities => columns::OPPORTUNITIES,
      EntityKind::Sows => columns::SOWS,
      EntityKind::Partners => columns::PARTNERS,
      EntityKind::Employees => columns::EMPLOYEES,
    }
  }

  pub fn from_command(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| kind.command() == name)
  }
}
