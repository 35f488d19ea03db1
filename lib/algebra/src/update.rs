use crate::Algebra;

/// The kind of an update command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateCommandType {
    InsertData,
    DeleteData,
    /// `DELETE`/`INSERT` ... `WHERE`
    Modify,
    Load,
    Clear,
    Create,
    Drop,
}

/// A single command of an update request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateCommand {
    command_type: UpdateCommandType,
    pattern: Option<Algebra>,
}

impl UpdateCommand {
    /// Creates a new [UpdateCommand] without a `WHERE` clause.
    pub fn new(command_type: UpdateCommandType) -> Self {
        Self {
            command_type,
            pattern: None,
        }
    }

    /// Attaches the algebra of the `WHERE` clause.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Algebra) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn command_type(&self) -> UpdateCommandType {
        self.command_type
    }

    /// The algebra of the `WHERE` clause, if the command has one.
    pub fn pattern(&self) -> Option<&Algebra> {
        self.pattern.as_ref()
    }
}

/// An update request that consists of a sequence of commands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateCommandSet {
    commands: Vec<UpdateCommand>,
}

impl UpdateCommandSet {
    /// Creates a new [UpdateCommandSet].
    pub fn new(commands: Vec<UpdateCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[UpdateCommand] {
        &self.commands
    }

    /// Returns a copy of this command set in which every `WHERE` clause has been replaced by
    /// `f(pattern)`.
    pub fn map_patterns(&self, mut f: impl FnMut(&Algebra) -> Algebra) -> Self {
        let commands = self
            .commands
            .iter()
            .map(|command| UpdateCommand {
                command_type: command.command_type,
                pattern: command.pattern.as_ref().map(&mut f),
            })
            .collect();
        Self { commands }
    }
}
