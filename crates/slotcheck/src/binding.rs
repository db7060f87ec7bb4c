//! Field bindings: how a value reaches an input and how a control is activated.
//!
//! Reactive front-ends keep their own copy of form state and only learn about
//! a new value through an `input` event. [`ReactiveBinding`] assigns the
//! property and fires that event itself; [`NativeBinding`] goes through real
//! key and pointer input instead. The runner only sees [`FieldBinding`], so a
//! different target application can swap the strategy.

use crate::driver::{DomEvent, ElementHandle, PageDriver};
use crate::result::SlotCheckResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set a field value and notify the page; activate a control
#[async_trait]
pub trait FieldBinding: Send + Sync + fmt::Debug {
    /// Put `value` into the input so the page's state observes it
    async fn fill(
        &self,
        driver: &dyn PageDriver,
        element: &ElementHandle,
        value: &str,
    ) -> SlotCheckResult<()>;

    /// Trigger the control's click handling
    async fn activate(&self, driver: &dyn PageDriver, element: &ElementHandle)
        -> SlotCheckResult<()>;
}

/// Property assignment plus synthetic bubbling events
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactiveBinding;

#[async_trait]
impl FieldBinding for ReactiveBinding {
    async fn fill(
        &self,
        driver: &dyn PageDriver,
        element: &ElementHandle,
        value: &str,
    ) -> SlotCheckResult<()> {
        driver.set_property(element, "value", value).await?;
        driver.dispatch_event(element, DomEvent::Input).await
    }

    async fn activate(
        &self,
        driver: &dyn PageDriver,
        element: &ElementHandle,
    ) -> SlotCheckResult<()> {
        driver.dispatch_event(element, DomEvent::Click).await
    }
}

/// Real key and pointer input
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBinding;

#[async_trait]
impl FieldBinding for NativeBinding {
    async fn fill(
        &self,
        driver: &dyn PageDriver,
        element: &ElementHandle,
        value: &str,
    ) -> SlotCheckResult<()> {
        driver.clear(element).await?;
        driver.type_text(element, value).await
    }

    async fn activate(
        &self,
        driver: &dyn PageDriver,
        element: &ElementHandle,
    ) -> SlotCheckResult<()> {
        driver.click(element).await
    }
}

/// Binding selector for configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// [`ReactiveBinding`]
    #[default]
    Reactive,
    /// [`NativeBinding`]
    Native,
}

impl BindingKind {
    /// Instantiate the binding
    #[must_use]
    pub fn build(self) -> Box<dyn FieldBinding> {
        match self {
            Self::Reactive => Box::new(ReactiveBinding),
            Self::Native => Box::new(NativeBinding),
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reactive => f.write_str("reactive"),
            Self::Native => f.write_str("native"),
        }
    }
}
