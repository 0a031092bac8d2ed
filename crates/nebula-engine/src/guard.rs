use std::fmt;

use config::Settings;
use nebula_protocol::AppContext;

/// Predicate over the ambient context that gates a command.
#[derive(Clone, Copy)]
pub struct Guard {
    /// Short name used in logs.
    name: &'static str,
    /// The predicate itself.
    check: fn(&AppContext, &Settings) -> bool,
}

impl Guard {
    /// Holds while the editor route is active.
    pub const EDITOR: Self = Self::new("editor", is_in_editor);

    /// A named guard over `check`.
    pub const fn new(name: &'static str, check: fn(&AppContext, &Settings) -> bool) -> Self {
        Self { name, check }
    }

    /// Evaluate against a context snapshot.
    pub fn allows(&self, ctx: &AppContext, settings: &Settings) -> bool {
        (self.check)(ctx, settings)
    }

    /// Guard name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guard").field(&self.name).finish()
    }
}

/// True when the current route lies under the editor prefix.
pub fn is_in_editor(ctx: &AppContext, settings: &Settings) -> bool {
    ctx.route.starts_with(&settings.editor_route_prefix)
}
