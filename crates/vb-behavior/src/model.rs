//! The `Behavior` trait: the contract shared by RSU and vehicle variants.

use vb_message::{Message, ProtocolId};

use crate::{NodeContext, Timer};

/// A protocol behavior installed on one node.
///
/// The harness drives it through four entry points: `start`/`stop` for the
/// lifecycle, `receive` for messages of a subscribed protocol and `on_timer`
/// for timers the behavior scheduled itself.  Every call runs to completion
/// on a single thread; waiting is always expressed as a scheduled [`Timer`].
///
/// # Example
///
/// ```rust,ignore
/// let mut rsu = RsuBehavior::new(RsuConfig::with_directions(dirs))?;
/// rsu.start(&mut ctx);
/// // ... harness pops timers and messages, calling on_timer / receive ...
/// rsu.stop(&mut ctx);
/// ```
pub trait Behavior {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Move to the running state and arm initial timers.
    ///
    /// A disabled behavior ignores the call; starting twice logs an error and
    /// changes nothing.
    fn start(&mut self, ctx: &mut NodeContext<'_>);

    /// Cancel every pending timer and move to the stopped state.
    fn stop(&mut self, ctx: &mut NodeContext<'_>);

    fn is_running(&self) -> bool;

    /// Whether messages of `protocol` should be delivered to this behavior.
    fn is_subscribed_to(&self, protocol: ProtocolId) -> bool;

    /// Handle one received message.  Unexpected message kinds are logged and
    /// dropped; nothing here is fatal.
    fn receive(&mut self, message: &Message, ctx: &mut NodeContext<'_>);

    /// Handle a timer previously scheduled through `ctx.scheduler`.
    fn on_timer(&mut self, timer: Timer, ctx: &mut NodeContext<'_>);
}
