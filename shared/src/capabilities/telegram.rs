//! The Telegram Mini App host runtime (`window.Telegram.WebApp`).
//!
//! Only [`TelegramOperation::LaunchData`] expects an answer; everything else
//! is a fire-and-forget notification to the host chrome.

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

use crate::model::LaunchData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelegramOperation {
    /// `initDataUnsafe`, or `None` when the page runs outside Telegram.
    LaunchData,
    Ready,
    Expand,
    SetBackButton { visible: bool },
    SetSettingsButton { visible: bool },
    ShowAlert { message: String },
    OpenLink { url: String },
    Close,
}

impl Operation for TelegramOperation {
    type Output = TelegramOutput;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelegramOutput {
    LaunchData(Option<Box<LaunchData>>),
    Done,
}

#[derive(Capability)]
pub struct Telegram<Ev> {
    context: CapabilityContext<TelegramOperation, Ev>,
}

impl<Ev> Telegram<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TelegramOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn launch_data<F>(&self, make_event: F)
    where
        F: FnOnce(Option<Box<LaunchData>>) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let data = match ctx.request_from_shell(TelegramOperation::LaunchData).await {
                TelegramOutput::LaunchData(data) => data,
                TelegramOutput::Done => None,
            };
            ctx.update_app(make_event(data));
        });
    }

    pub fn ready(&self) {
        self.notify(TelegramOperation::Ready);
    }

    pub fn expand(&self) {
        self.notify(TelegramOperation::Expand);
    }

    pub fn set_back_button(&self, visible: bool) {
        self.notify(TelegramOperation::SetBackButton { visible });
    }

    pub fn set_settings_button(&self, visible: bool) {
        self.notify(TelegramOperation::SetSettingsButton { visible });
    }

    pub fn show_alert(&self, message: impl Into<String>) {
        self.notify(TelegramOperation::ShowAlert {
            message: message.into(),
        });
    }

    pub fn open_link(&self, url: impl Into<String>) {
        self.notify(TelegramOperation::OpenLink { url: url.into() });
    }

    pub fn close(&self) {
        self.notify(TelegramOperation::Close);
    }

    fn notify(&self, operation: TelegramOperation) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
