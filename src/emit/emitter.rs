//! Emits initialization operations in dependency order.

use std::collections::HashSet;

use tracing::debug;

use crate::build_context::FinalizedBuild;
use crate::component::{
    Automation, Component, ComponentKind, LinkDirection, TriggerBinding, TriggerSet,
};
use crate::config::{ConfigError, ReferenceFailure};
use crate::pipeline::LinkedInstance;
use crate::registry::Identifier;
use crate::target::Platform;

use super::{BuildPlan, InitOp};

/// Builds a [`BuildPlan`] from linked components.
///
/// Instances are emitted in document order, then every automation in the
/// order of its owner. Before an operation names another instance, that
/// instance must already have been emitted; the emitter checks this itself
/// rather than trusting the linker.
#[derive(Debug)]
pub struct Emitter {
    target: Platform,
    operations: Vec<InitOp>,
    emitted: HashSet<Identifier>,
    triggers: TriggerSet,
}

impl Emitter {
    /// Creates an emitter for `target`.
    #[must_use]
    pub fn new(target: Platform) -> Self {
        Self {
            target,
            operations: Vec::new(),
            emitted: HashSet::new(),
            triggers: TriggerSet::new(),
        }
    }

    /// Emits every instance and returns the finished plan.
    ///
    /// `components` and `instances` are parallel slices in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedReference`] with
    /// [`ReferenceFailure::DeclaredLater`] if a link or action names an
    /// instance that has not been emitted yet.
    pub fn emit(
        mut self,
        components: &[Box<dyn Component>],
        instances: &[LinkedInstance],
        build: FinalizedBuild,
    ) -> Result<BuildPlan, ConfigError> {
        for (component, instance) in components.iter().zip(instances) {
            self.emit_instance(component.as_ref(), instance)?;
        }
        for (component, instance) in components.iter().zip(instances) {
            let automations = component.automations().iter().zip(&instance.triggers);
            for (index, (automation, trigger)) in automations.enumerate() {
                self.emit_automation(&instance.id, index, automation, trigger)?;
            }
        }

        Ok(BuildPlan {
            target: self.target,
            operations: self.operations,
            build_flags: build.flags,
            libraries: build.libraries,
            serial_override: build.serial_override,
            triggers: self.triggers,
        })
    }

    fn emit_instance(
        &mut self,
        component: &dyn Component,
        instance: &LinkedInstance,
    ) -> Result<(), ConfigError> {
        let id = &instance.id;
        let before = self.operations.len();
        component.emit(id, &mut self.operations);
        self.emitted.insert(id.clone());

        for link in &instance.links {
            self.require_emitted(id, &link.field, &link.target, link.expected)?;
            let op = match link.direction {
                LinkDirection::Outgoing => InitOp::Link {
                    id: id.clone(),
                    method: link.setter,
                    target: link.target.clone(),
                },
                LinkDirection::Incoming => InitOp::Link {
                    id: link.target.clone(),
                    method: link.setter,
                    target: id.clone(),
                },
            };
            self.operations.push(op);
        }

        debug!("Emitted {} operation(s) for '{id}'", self.operations.len() - before);
        Ok(())
    }

    fn emit_automation(
        &mut self,
        owner: &Identifier,
        index: usize,
        automation: &Automation,
        trigger: &Identifier,
    ) -> Result<(), ConfigError> {
        for (i, action) in automation.actions.iter().enumerate() {
            if let Some((target, expected)) = action.target() {
                let field = format!("{}[{index}].then[{i}]", automation.event);
                self.require_emitted(owner, &field, target, expected)?;
            }
        }

        self.operations
            .push(InitOp::construct(trigger, automation.trigger_kind));
        self.operations.push(InitOp::Link {
            id: owner.clone(),
            method: automation.setter,
            target: trigger.clone(),
        });
        self.operations.push(InitOp::Automation {
            trigger: trigger.clone(),
            actions: automation.actions.clone(),
        });
        self.emitted.insert(trigger.clone());

        self.triggers.register(TriggerBinding {
            owner: owner.clone(),
            event: automation.event,
            trigger: trigger.clone(),
            actions: automation.actions.clone(),
        });
        Ok(())
    }

    fn require_emitted(
        &self,
        referrer: &Identifier,
        field: &str,
        target: &Identifier,
        expected: ComponentKind,
    ) -> Result<(), ConfigError> {
        if target != referrer && self.emitted.contains(target) {
            return Ok(());
        }
        Err(ConfigError::UnresolvedReference {
            referrer: referrer.to_string(),
            field: field.to_string(),
            target: target.to_string(),
            reason: ReferenceFailure::DeclaredLater { expected },
        })
    }
}
