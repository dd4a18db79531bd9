//! Conditional frame stack for nested `if` and `switch` blocks

/// What opened a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// The base frame, present for the whole stream
    None,
    If,
    Switch,
}

/// One level of conditional nesting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalFrame {
    pub kind: FrameKind,
    pub output_enabled: bool,
    /// Output state of the enclosing frame when this one was pushed
    pub parent_enabled: bool,
    pub switch_value: Option<String>,
    pub switch_matched: bool,
    pub switch_default_seen: bool,
}

impl ConditionalFrame {
    fn base() -> Self {
        Self {
            kind: FrameKind::None,
            output_enabled: true,
            parent_enabled: true,
            switch_value: None,
            switch_matched: false,
            switch_default_seen: false,
        }
    }

    fn if_frame(parent_enabled: bool, condition: bool) -> Self {
        Self {
            kind: FrameKind::If,
            output_enabled: parent_enabled && condition,
            parent_enabled,
            ..Self::base()
        }
    }

    fn switch_frame(parent_enabled: bool, value: String) -> Self {
        Self {
            kind: FrameKind::Switch,
            output_enabled: false,
            parent_enabled,
            switch_value: Some(value),
            ..Self::base()
        }
    }
}

/// Stack of conditional frames; the base frame is never popped
#[derive(Debug, Clone)]
pub struct FrameStack {
    frames: Vec<ConditionalFrame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self {
            frames: vec![ConditionalFrame::base()],
        }
    }

    pub fn current(&self) -> &ConditionalFrame {
        self.frames.last().unwrap_or_else(|| unreachable!("base frame popped"))
    }

    pub fn current_mut(&mut self) -> &mut ConditionalFrame {
        self.frames.last_mut().unwrap_or_else(|| unreachable!("base frame popped"))
    }

    pub fn output_enabled(&self) -> bool {
        self.current().output_enabled
    }

    /// Number of open frames above the base
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn push_if(&mut self, condition: bool) {
        let parent_enabled = self.output_enabled();
        self.frames.push(ConditionalFrame::if_frame(parent_enabled, condition));
    }

    pub fn push_switch(&mut self, value: String) {
        let parent_enabled = self.output_enabled();
        self.frames.push(ConditionalFrame::switch_frame(parent_enabled, value));
    }

    /// Pop the innermost frame; returns `None` if only the base remains
    pub fn pop(&mut self) -> Option<ConditionalFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_frame_survives_pop() {
        let mut stack = FrameStack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop().is_none());
        assert_eq!(stack.current().kind, FrameKind::None);
        assert!(stack.output_enabled());
    }

    #[test]
    fn test_if_inherits_parent() {
        let mut stack = FrameStack::new();
        stack.push_if(false);
        assert!(!stack.output_enabled());

        stack.push_if(true);
        assert!(!stack.output_enabled());
        assert!(!stack.current().parent_enabled);
        assert_eq!(stack.depth(), 2);

        stack.pop();
        stack.pop();
        assert!(stack.output_enabled());
    }

    #[test]
    fn test_switch_starts_disabled() {
        let mut stack = FrameStack::new();
        stack.push_switch("B".to_string());
        let frame = stack.current();
        assert_eq!(frame.kind, FrameKind::Switch);
        assert_eq!(frame.switch_value.as_deref(), Some("B"));
        assert!(!frame.output_enabled);
        assert!(!frame.switch_matched);
        assert!(!frame.switch_default_seen);
    }
}
