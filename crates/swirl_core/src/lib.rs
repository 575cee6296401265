//! Numerical core of the Swirl attractor animator.
//!
//! Everything a front end needs to integrate and display a chaotic
//! attractor lives here; windows, plots, and controls are the front end's
//! business and call in through plain methods.
//!
//! Key components:
//! - **Fields** (`field`): the Lorenz, Thomas, and Rössler flows with
//!   their coefficient catalogs and default initial states.
//! - **Solvers** (`solvers`): fixed-step schemes (explicit Euler, classic
//!   RK4, Fehlberg 4/5) returning per-step timing and a relative local
//!   error estimate.
//! - **Trajectory** (`trajectory`): the append-only record of visited
//!   states, with a snapshot form for exporters.
//! - **Session** (`session`): the advance/pause/restart state machine
//!   driving one plot, with rolling timing/error statistics; `group`
//!   drives several sessions together.

pub mod field;
pub mod group;
pub mod session;
pub mod solvers;
pub mod trajectory;
