#![forbid(unsafe_code)]

//! Elm-style runtime for the terminal console.
//!
//! The program runtime manages the update/view loop: it reads terminal
//! events, converts them into the model's messages, executes the returned
//! commands, and redraws when something changed. State lives in the
//! [`Model`]; rendering is a pure function of it.
//!
//! # Example
//!
//! ```ignore
//! use casefile_runtime::{Cmd, Model};
//! use casefile_runtime::frame::{Frame, StyleFlags};
//! use casefile_core::event::Event;
//!
//! struct Counter {
//!     count: i32,
//! }
//!
//! enum Msg {
//!     Increment,
//!     Quit,
//!     Ignore,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             Event::Key(k) if k.is_char('+') => Msg::Increment,
//!             _ => Msg::Ignore,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!             Msg::Ignore => Cmd::none(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         frame.print(0, 0, &self.count.to_string(), StyleFlags::empty());
//!     }
//! }
//! ```

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use casefile_core::event::Event;
use casefile_core::terminal_session::{SessionOptions, TerminalSession};
use tracing::{debug, debug_span, info};

use crate::frame::Frame;
use crate::presenter::Presenter;

/// The Model trait defines application state and behavior.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Messages represent actions that update the model state.
    /// Must be convertible from terminal events.
    type Message: From<Event> + Send + 'static;

    /// Initialize the model with startup commands.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    ///
    /// This is the core state transition function. Returns commands
    /// for any side effects that should be executed.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state to a frame.
    fn view(&self, frame: &mut Frame);
}

/// Commands returned from `Model::update`.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Quit the application.
    Quit,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver `Event::Tick` to the model every `Duration`.
    Tick(Duration),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
        }
    }
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a tick command.
    #[inline]
    pub fn tick(every: Duration) -> Self {
        Self::Tick(every)
    }

    /// Create a batch of commands, collapsing trivial cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Whether this is the no-op command.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Configuration for a [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Run in the alternate screen.
    pub alternate_screen: bool,
    /// Capture mouse events.
    pub mouse: bool,
    /// Enable bracketed paste.
    pub bracketed_paste: bool,
    /// How long to wait for input when no tick is scheduled.
    pub poll_timeout: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            bracketed_paste: true,
            poll_timeout: Duration::from_millis(100),
        }
    }
}

/// Runs a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    config: ProgramConfig,
    width: u16,
    height: u16,
    running: bool,
    dirty: bool,
    tick_rate: Option<Duration>,
    last_tick: Instant,
}

impl<M: Model> Program<M> {
    /// Enter the terminal and prepare to run `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be put into raw mode or its
    /// size cannot be queried.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
            bracketed_paste: config.bracketed_paste,
        })?;
        let (width, height) = session.size()?;
        Ok(Self {
            model,
            session,
            presenter: Presenter::new(io::stdout()),
            config,
            width: width.max(1),
            height: height.max(1),
            running: true,
            dirty: true,
            tick_rate: None,
            last_tick: Instant::now(),
        })
    }

    /// Run the event loop until the model returns `Cmd::Quit`.
    ///
    /// # Errors
    ///
    /// Propagates terminal I/O errors. The terminal is restored either way
    /// when the program is dropped.
    pub fn run(&mut self) -> io::Result<()> {
        info!(width = self.width, height = self.height, "program starting");

        let cmd = {
            let _span = debug_span!("casefile.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;

        // Models learn the initial size the same way they learn later ones.
        self.dispatch(Event::Resize {
            width: self.width,
            height: self.height,
        })?;
        self.render_frame()?;

        while self.running {
            let timeout = self.effective_timeout();
            if self.session.poll_event(timeout)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if self.running && self.should_tick() {
                self.dispatch(Event::Tick)?;
            }

            if self.running && self.dirty {
                self.render_frame()?;
            }
        }

        info!("program stopped");
        Ok(())
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            debug!(width, height, "resize");
            self.width = width.max(1);
            self.height = height.max(1);
            self.presenter.invalidate();
            self.dirty = true;
        }
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: Event) -> io::Result<()> {
        let msg = M::Message::from(event);
        let cmd = self.model.update(msg);
        self.dirty = true;
        self.execute_cmd(cmd)
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.dirty = true;
                self.execute_cmd(cmd)?;
            }
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.tick_rate = Some(duration);
                self.last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        self.presenter.present(&frame.buffer, frame.cursor())?;
        self.dirty = false;
        Ok(())
    }

    fn effective_timeout(&self) -> Duration {
        match self.tick_rate {
            Some(rate) => rate.saturating_sub(self.last_tick.elapsed()),
            None => self.config.poll_timeout,
        }
    }

    fn should_tick(&mut self) -> bool {
        if let Some(tick_rate) = self.tick_rate
            && self.last_tick.elapsed() >= tick_rate
        {
            self.last_tick = Instant::now();
            return true;
        }
        false
    }
}
