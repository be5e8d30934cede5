use crate::Agent;
use crate::state::{Field, MergePolicy};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Terminal marker: `.then(END)` closes the chain.
pub const END: &str = "__end__";

// ---------------------------------------------------------------------------
// WorkflowError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("duplicate agent name: {0}")]
    DuplicateAgent(&'static str),
    #[error("unknown step: {0}")]
    UnknownStep(&'static str),
    #[error("workflow missing start step")]
    MissingStart,
    #[error("step '{0}' already has a next step")]
    Branch(&'static str),
    #[error("step '{0}' has no next step and never reaches END")]
    MissingEnd(&'static str),
    #[error("step '{0}' is visited twice")]
    Cycle(&'static str),
    #[error("step '{0}' is registered but not reachable from the start")]
    Unreachable(&'static str),
    #[error("step '{step}' cannot own field '{field}'")]
    ReservedField { step: &'static str, field: Field },
    #[error("field '{field}' is written by both '{first}' and '{second}'")]
    DuplicateWriter {
        field: Field,
        first: &'static str,
        second: &'static str,
    },
    #[error("step '{step}' reads '{field}' before any earlier step writes it")]
    ReadBeforeWrite { step: &'static str, field: Field },
}

// ---------------------------------------------------------------------------
// WorkflowBuilder
// ---------------------------------------------------------------------------

pub struct WorkflowBuilder {
    name: &'static str,
    start: Option<&'static str>,
    chain_last: Option<&'static str>,
    agents: HashMap<&'static str, Box<dyn Agent>>,
    default_next: HashMap<&'static str, &'static str>,
    duplicate: Option<&'static str>,
    branch: Option<&'static str>,
}

impl WorkflowBuilder {
    pub fn register<A: Agent>(mut self, agent: A) -> Self {
        let name = agent.name();
        if self.agents.contains_key(name) {
            self.duplicate = Some(name);
        }
        self.agents.insert(name, Box::new(agent));

        // If this is the first agent added and start isn't set, default start to it.
        if self.start.is_none() {
            self.start = Some(name);
        }

        // Also initialize chain_last if it's not set.
        if self.chain_last.is_none() {
            self.chain_last = Some(name);
        }

        self
    }

    pub fn start_at(mut self, step: &'static str) -> Self {
        self.start = Some(step);
        self.chain_last = Some(step);
        self
    }

    /// Chain the next step: current(chain_last) -> next. Use [`END`] to close.
    pub fn then(mut self, next: &'static str) -> Self {
        let Some(current) = self.chain_last else {
            // No prior step; treat `next` as the start
            self.start = Some(next);
            self.chain_last = Some(next);
            return self;
        };

        if self.default_next.insert(current, next).is_some() && self.branch.is_none() {
            self.branch = Some(current);
        }
        self.chain_last = Some(next);
        self
    }

    pub fn build(self) -> Result<Workflow, WorkflowError> {
        if let Some(name) = self.duplicate {
            return Err(WorkflowError::DuplicateAgent(name));
        }
        if let Some(name) = self.branch {
            return Err(WorkflowError::Branch(name));
        }

        let start = self.start.ok_or(WorkflowError::MissingStart)?;
        if !self.agents.contains_key(start) {
            return Err(WorkflowError::UnknownStep(start));
        }

        // Every edge must join registered agents (or finish at END).
        for (&from, &to) in &self.default_next {
            if !self.agents.contains_key(from) {
                return Err(WorkflowError::UnknownStep(from));
            }
            if to != END && !self.agents.contains_key(to) {
                return Err(WorkflowError::UnknownStep(to));
            }
        }

        let order = walk(start, &self.default_next)?;

        let mut names: Vec<&'static str> = self.agents.keys().copied().collect();
        names.sort_unstable();
        if let Some(stray) = names.into_iter().find(|n| !order.contains(n)) {
            return Err(WorkflowError::Unreachable(stray));
        }

        check_fields(&order, &self.agents)?;

        Ok(Workflow {
            name: self.name,
            start,
            order,
            agents: self.agents,
            default_next: self.default_next,
        })
    }
}

/// Follow edges from `start` to END, returning the visiting order.
fn walk(
    start: &'static str,
    default_next: &HashMap<&'static str, &'static str>,
) -> Result<Vec<&'static str>, WorkflowError> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            return Err(WorkflowError::Cycle(current));
        }
        order.push(current);
        match default_next.get(current) {
            None => return Err(WorkflowError::MissingEnd(current)),
            Some(&END) => return Ok(order),
            Some(&next) => current = next,
        }
    }
}

/// One writer per field, and every read satisfied by the seed or an earlier step.
fn check_fields(
    order: &[&'static str],
    agents: &HashMap<&'static str, Box<dyn Agent>>,
) -> Result<(), WorkflowError> {
    let mut writers: HashMap<Field, &'static str> = HashMap::new();

    for &step in order {
        let agent = &agents[step];

        for &field in agent.reads() {
            if field != Field::Query && !writers.contains_key(&field) {
                return Err(WorkflowError::ReadBeforeWrite { step, field });
            }
        }

        let field = agent.writes();
        if field == Field::Query || field.merge_policy() == MergePolicy::Append {
            return Err(WorkflowError::ReservedField { step, field });
        }
        if let Some(&first) = writers.get(&field) {
            return Err(WorkflowError::DuplicateWriter {
                field,
                first,
                second: step,
            });
        }
        writers.insert(field, step);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Workflow (validated, only constructed via build())
// ---------------------------------------------------------------------------

pub struct Workflow {
    name: &'static str,
    start: &'static str,
    order: Vec<&'static str>,
    agents: HashMap<&'static str, Box<dyn Agent>>,
    default_next: HashMap<&'static str, &'static str>,
}

impl Workflow {
    pub fn builder(name: &'static str) -> WorkflowBuilder {
        WorkflowBuilder {
            name,
            start: None,
            chain_last: None,
            agents: HashMap::new(),
            default_next: HashMap::new(),
            duplicate: None,
            branch: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Step names in execution order.
    pub fn order(&self) -> &[&'static str] {
        &self.order
    }

    // --- stuff the runner uses (keep pub(crate)) ---
    pub(crate) fn start(&self) -> &'static str {
        self.start
    }

    pub(crate) fn agent(&self, name: &str) -> Option<&dyn Agent> {
        self.agents.get(name).map(|a| a.as_ref())
    }

    pub(crate) fn default_next(&self, from: &str) -> Option<&'static str> {
        self.default_next.get(from).copied()
    }
}
