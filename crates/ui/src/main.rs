use std::sync::Arc;

use gpui::*;
use gpui_component::notification::NotificationList;
use gpui_component::{Root, ThemeRegistry};
use sdm_dashboard::app::{AppShell, NewChat, Quit, ToggleSidebar};
use sdm_dashboard::theme::{apply_theme, default_themes_path};
use sdm_session::{SettingsStore, init_tracing};

/// Application entry point.
///
/// Loads settings first so the log filter and theme apply from the start, then
/// starts the tokio runtime that runs deferred assistant replies, and finally
/// opens the main window inside a gpui-component `Root`.
fn main() {
    let settings = Arc::new(SettingsStore::load());
    init_tracing(&settings.settings().log_filter);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("sdm-replies")
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(%error, "failed to start reply runtime");
            std::process::exit(1);
        }
    };
    let runtime_handle = runtime.handle().clone();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        // Required before any Root usage.
        gpui_component::init(cx);

        let theme = settings.settings().theme_mode;
        // Missing theme directories are not fatal; built-in themes still apply.
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
            apply_theme(theme, None, cx);
            tracing::info!("theme directory watch initialized");
        }) {
            tracing::warn!("failed to watch themes directory: {}. using default themes", err);
        }
        apply_theme(theme, None, cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-n", NewChat, None),
            KeyBinding::new("cmd-b", ToggleSidebar, None),
        ]);

        let settings = settings.clone();
        let runtime_handle = runtime_handle.clone();
        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1200.), px(800.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                    window_decorations: Some(WindowDecorations::Client),
                    #[cfg(not(any(target_os = "linux", target_os = "freebsd")))]
                    window_decorations: None,
                    ..Default::default()
                };

                cx.open_window(options, |window, cx| {
                    let notification_list = cx.new(|cx| NotificationList::new(window, cx));
                    let shell = cx.new(|cx| {
                        AppShell::new(notification_list, settings, runtime_handle, window, cx)
                    });
                    cx.new(|cx| Root::new(shell, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });

    drop(runtime);
}
