use crate::commands::CommandAction;
use crate::config::Config;
use crate::crm::{CrmClient, EntityKind};
use crate::event::{Event, EventHandler};
use crate::master_data::MasterDataCache;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{Notification, ShortcutInfo, View, ViewAction};
use crate::ui::views::RecordListView;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Shared handles every view gets a clone of
#[derive(Clone)]
pub struct AppContext {
  pub crm: CrmClient,
  pub master: Arc<MasterDataCache<CrmClient>>,
  pub export_dir: PathBuf,
}

impl AppContext {
  pub fn new(config: &Config) -> Result<Self> {
    let crm = CrmClient::new(config)?;
    let ttl = chrono::Duration::minutes(config.master_data.cache_minutes);
    let master = MasterDataCache::new(crm.clone()).with_ttl(ttl);
    Ok(Self {
      crm,
      master: Arc::new(master),
      export_dir: config.export_dir(),
    })
  }

  /// Fill the master data cache in the background
  pub fn warm_master_data(&self) {
    let master = self.master.clone();
    tokio::spawn(async move { master.warm().await });
  }
}

/// Main application state
pub struct App {
  ctx: AppContext,
  title: String,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  command_input: CommandInput,
  notification: Option<Notification>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let entity = config
      .entity()
      .ok_or_else(|| eyre!("Unknown default view '{}'", config.default_view))?;
    let ctx = AppContext::new(&config)?;
    let title = config
      .title
      .clone()
      .unwrap_or_else(|| ctx.crm.host().to_string());

    let root: Box<dyn View> = Box::new(RecordListView::new(ctx.clone(), entity));

    Ok(Self {
      ctx,
      title,
      view_stack: vec![root],
      command_input: CommandInput::new(),
      notification: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    self.ctx.warm_master_data();
    info!(host = self.ctx.crm.host(), "crmview started");

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // Palette first, unless the view has a text box or modal open
    let view_captures = self
      .view_stack
      .last()
      .is_some_and(|view| view.captures_input());
    if !view_captures || self.command_input.is_active() {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(action)) => {
          self.execute_command(action);
          return;
        }
        KeyResult::Event(CommandEvent::Unknown(name)) => {
          self.notification = Some(Notification::error(format!("Unknown command: {}", name)));
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let Some(view) = self.view_stack.last_mut() else {
      return;
    };
    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(next) => self.view_stack.push(next),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }

    if let Some(notification) = self.view_stack.last_mut().and_then(|v| v.take_notification()) {
      self.notification = Some(notification);
    }
  }

  fn execute_command(&mut self, action: CommandAction) {
    match action {
      CommandAction::Open(entity) => self.open_root(entity),
      CommandAction::ReloadMasterData => {
        self.ctx.master.clear();
        self.ctx.warm_master_data();
        self.notification = Some(Notification::info("Reloading regions and countries"));
      }
      CommandAction::Quit => self.should_quit = true,
    }
  }

  /// Replace the whole stack with a fresh list of `entity`
  fn open_root(&mut self, entity: EntityKind) {
    info!(entity = entity.command(), "Opening view");
    self.view_stack.clear();
    self
      .view_stack
      .push(Box::new(RecordListView::new(self.ctx.clone(), entity)));
  }

  fn tick(&mut self) {
    for view in self.view_stack.iter_mut() {
      view.tick();
      if let Some(notification) = view.take_notification() {
        self.notification = Some(notification);
      }
    }
    if self.notification.as_ref().is_some_and(|n| n.is_expired()) {
      self.notification = None;
    }
    if self.view_stack.is_empty() {
      warn!("View stack is empty, quitting");
      self.should_quit = true;
    }
  }

  // Accessors for UI rendering
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn host(&self) -> &str {
    self.ctx.crm.host()
  }

  pub fn current_entity(&self) -> Option<EntityKind> {
    self.view_stack.last().and_then(|v| v.entity())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn notification(&self) -> Option<&Notification> {
    self.notification.as_ref()
  }
}
