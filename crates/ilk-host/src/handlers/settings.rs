use ilk_core::{
    hooks::{pre_setting_update, setting_updated, SettingUpdateContext},
    settings::Setting,
};

use crate::{router::AppState, OutboundRecord};

pub(super) fn handle_setting_updating(
    state: &mut AppState,
    old_setting: Setting,
    new_setting: Setting,
) {
    let accepted = state.store.validate(&new_setting);
    let setting = pre_setting_update(
        &state.store,
        SettingUpdateContext {
            old_setting,
            new_setting,
        },
    );

    state
        .outbox
        .push(OutboundRecord::SettingDecision { setting, accepted });
}

pub(super) fn handle_setting_updated(state: &mut AppState, setting: Setting) {
    tracing::debug!(?setting, "setting updated");
    setting_updated(&mut state.store, &setting);
    state.settings_host.persist(setting);
}
