//! Android framework hooks.
//!
//! # Emulated Members
//!
//! | Member | Answer |
//! |--------|--------|
//! | `Build.VERSION.SDK_INT` | configured API level |
//! | `ApplicationInfo.targetSdkVersion` | configured target API level |
//! | `ApplicationInfo.nativeLibraryDir` | `{install_dir}/lib/arm64` |
//! | `Settings.System.getString(cr, "android_id")` | lower-cased android id |
//! | `Context.getApplicationInfo()` | opaque `ApplicationInfo` |
//! | `Context.getFilesDir()` | `/data/user/0/{package}/files` |
//! | `Context.getContentResolver()` | opaque `ContentResolver` |
//! | `Context.getPackageResourcePath()` | `{install_dir}/base.apk` |
//! | `Context.getPackageName()` | configured package |
//! | `Context.getExternalFilesDir(String)` | `/mnt/sdcard` |
//! | `Context.toString()` | receiver rendered as a string |
//! | `PackageManager.queryIntentServices(Intent, int)` | empty list |
//! | `Intent(String)`, `Intent.addCategory(String)` | host-side intent |
//! | `File(String)` | host-side file |
//! | `File.canRead()` | `false` for the app data parent folders |
//!
//! Other `Settings.System` keys and other `File.canRead` paths reach the guest runtime's default
//! behavior.

use std::path::PathBuf;

use crate::{
    env::{CallKind, Environment, Hook, HookContext, HookManager, HostObject, JniValue, PreHookResult},
    Result,
};

const BUILD_SDK_INT: &str = "android/os/Build$VERSION->SDK_INT:I";
const APPINFO_TARGET_SDK: &str = "android/content/pm/ApplicationInfo->targetSdkVersion:I";
const APPINFO_NATIVE_LIB_DIR: &str =
    "android/content/pm/ApplicationInfo->nativeLibraryDir:Ljava/lang/String;";
const SETTINGS_GET_STRING: &str = "android/provider/Settings$System->getString(Landroid/content/ContentResolver;Ljava/lang/String;)Ljava/lang/String;";
const CONTEXT_GET_APPLICATION_INFO: &str =
    "android/content/Context->getApplicationInfo()Landroid/content/pm/ApplicationInfo;";
const CONTEXT_GET_FILES_DIR: &str = "android/content/Context->getFilesDir()Ljava/io/File;";
const CONTEXT_GET_CONTENT_RESOLVER: &str =
    "android/content/Context->getContentResolver()Landroid/content/ContentResolver;";
const CONTEXT_GET_PACKAGE_RESOURCE_PATH: &str =
    "android/content/Context->getPackageResourcePath()Ljava/lang/String;";
const FILE_GET_PACKAGE_RESOURCE_PATH: &str =
    "java/io/File->getPackageResourcePath()Ljava/lang/String;";
const CONTEXT_GET_PACKAGE_NAME: &str = "android/content/Context->getPackageName()Ljava/lang/String;";
const CONTEXT_GET_EXTERNAL_FILES_DIR: &str =
    "android/content/Context->getExternalFilesDir(Ljava/lang/String;)Ljava/io/File;";
const CONTEXT_TO_STRING: &str = "android/content/Context->toString()Ljava/lang/String;";
const PM_QUERY_INTENT_SERVICES: &str = "android/content/pm/PackageManager->queryIntentServices(Landroid/content/Intent;I)Ljava/util/List;";
const INTENT_ADD_CATEGORY: &str =
    "android/content/Intent->addCategory(Ljava/lang/String;)Landroid/content/Intent;";
const INTENT_INIT: &str = "android/content/Intent-><init>(Ljava/lang/String;)V";
const FILE_INIT: &str = "java/io/File-><init>(Ljava/lang/String;)V";
const FILE_CAN_READ: &str = "java/io/File->canRead()Z";

/// Registers all Android framework hooks with the given hook manager.
pub fn register(manager: &mut HookManager) {
    manager.register(
        Hook::new("Build.VERSION.SDK_INT")
            .match_signature(CallKind::StaticGet, BUILD_SDK_INT)
            .pre(build_sdk_int_pre),
    );

    manager.register(
        Hook::new("ApplicationInfo.targetSdkVersion")
            .match_signature(CallKind::InstanceGet, APPINFO_TARGET_SDK)
            .pre(appinfo_target_sdk_pre),
    );

    manager.register(
        Hook::new("ApplicationInfo.nativeLibraryDir")
            .match_signature(CallKind::InstanceGet, APPINFO_NATIVE_LIB_DIR)
            .pre(appinfo_native_lib_dir_pre),
    );

    manager.register(
        Hook::new("Settings.System.getString")
            .match_signature(CallKind::StaticCall, SETTINGS_GET_STRING)
            .match_runtime("key=android_id", |ctx| {
                ctx.arg_str(1).is_ok_and(|key| key == "android_id")
            })
            .pre(settings_android_id_pre),
    );

    // Context
    manager.register(
        Hook::new("Context.getApplicationInfo")
            .match_signature(CallKind::InstanceCall, CONTEXT_GET_APPLICATION_INFO)
            .pre(|_, _| opaque("android/content/pm/ApplicationInfo")),
    );

    manager.register(
        Hook::new("Context.getFilesDir")
            .match_signature(CallKind::InstanceCall, CONTEXT_GET_FILES_DIR)
            .pre(context_get_files_dir_pre),
    );

    manager.register(
        Hook::new("Context.getContentResolver")
            .match_signature(CallKind::InstanceCall, CONTEXT_GET_CONTENT_RESOLVER)
            .pre(|_, _| opaque("android/content/ContentResolver")),
    );

    manager.register(
        Hook::new("Context.getPackageResourcePath")
            .match_signature(CallKind::InstanceCall, CONTEXT_GET_PACKAGE_RESOURCE_PATH)
            .pre(package_resource_path_pre),
    );

    manager.register(
        Hook::new("File.getPackageResourcePath")
            .match_signature(CallKind::InstanceCall, FILE_GET_PACKAGE_RESOURCE_PATH)
            .pre(package_resource_path_pre),
    );

    manager.register(
        Hook::new("Context.getPackageName")
            .match_signature(CallKind::InstanceCall, CONTEXT_GET_PACKAGE_NAME)
            .pre(|_, env| {
                Ok(PreHookResult::Bypass(Some(
                    env.config().identity.package_name.clone().into(),
                )))
            }),
    );

    manager.register(
        Hook::new("Context.getExternalFilesDir")
            .match_signature(CallKind::InstanceCall, CONTEXT_GET_EXTERNAL_FILES_DIR)
            .pre(|_, _| {
                Ok(PreHookResult::Bypass(Some(
                    HostObject::File(PathBuf::from("/mnt/sdcard")).into(),
                )))
            }),
    );

    manager.register(
        Hook::new("Context.toString")
            .match_signature(CallKind::InstanceCall, CONTEXT_TO_STRING)
            .pre(context_to_string_pre),
    );

    // PackageManager, Intent, File
    manager.register(
        Hook::new("PackageManager.queryIntentServices")
            .match_signature(CallKind::InstanceCall, PM_QUERY_INTENT_SERVICES)
            .pre(|_, _| Ok(PreHookResult::Bypass(Some(HostObject::List(Vec::new()).into())))),
    );

    manager.register(
        Hook::new("Intent.addCategory")
            .match_signature(CallKind::InstanceCall, INTENT_ADD_CATEGORY)
            .pre(intent_add_category_pre),
    );

    manager.register(
        Hook::new("Intent.<init>")
            .match_signature(CallKind::Construct, INTENT_INIT)
            .pre(intent_init_pre),
    );

    manager.register(
        Hook::new("File.<init>")
            .match_signature(CallKind::Construct, FILE_INIT)
            .pre(file_init_pre),
    );

    manager.register(
        Hook::new("File.canRead")
            .match_signature(CallKind::InstanceCall, FILE_CAN_READ)
            .pre(file_can_read_pre),
    );
}

fn opaque(class: &str) -> Result<PreHookResult> {
    Ok(PreHookResult::Bypass(Some(HostObject::class(class).into())))
}

fn build_sdk_int_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    Ok(PreHookResult::Bypass(Some(JniValue::Int(
        env.config().device.sdk_version,
    ))))
}

fn appinfo_target_sdk_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    Ok(PreHookResult::Bypass(Some(JniValue::Int(
        env.config().device.target_sdk_version,
    ))))
}

fn appinfo_native_lib_dir_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let dir = format!("{}/lib/arm64", env.config().identity.install_dir());
    Ok(PreHookResult::Bypass(Some(dir.into())))
}

/// `Settings.System.getString(ContentResolver, String)`, only for the `android_id` key.
fn settings_android_id_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let android_id = env.config().identity.android_id.to_lowercase();
    Ok(PreHookResult::Bypass(Some(android_id.into())))
}

fn context_get_files_dir_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let dir = format!("{}/files", env.config().identity.data_dir());
    Ok(PreHookResult::Bypass(Some(
        HostObject::File(PathBuf::from(dir)).into(),
    )))
}

fn package_resource_path_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let path = format!("{}/base.apk", env.config().identity.install_dir());
    Ok(PreHookResult::Bypass(Some(path.into())))
}

fn context_to_string_pre(ctx: &HookContext<'_>, _env: &Environment) -> Result<PreHookResult> {
    let rendered = ctx.this_object()?.to_string();
    Ok(PreHookResult::Bypass(Some(rendered.into())))
}

/// `Intent.addCategory(String)`
///
/// Returns the receiver with the category appended.
fn intent_add_category_pre(ctx: &HookContext<'_>, _env: &Environment) -> Result<PreHookResult> {
    let category = ctx.arg_str(0)?;
    match ctx.this_object()? {
        HostObject::Intent { action, categories } => {
            let mut categories = categories.clone();
            categories.push(category.to_string());
            Ok(PreHookResult::Bypass(Some(
                HostObject::Intent {
                    action: action.clone(),
                    categories,
                }
                .into(),
            )))
        }
        _ => Err(crate::Error::InvalidReceiver {
            signature: ctx.signature.to_string(),
            expected: "Intent",
        }),
    }
}

fn intent_init_pre(ctx: &HookContext<'_>, _env: &Environment) -> Result<PreHookResult> {
    let action = ctx.arg_str(0)?;
    Ok(PreHookResult::Bypass(Some(
        HostObject::Intent {
            action: action.to_string(),
            categories: Vec::new(),
        }
        .into(),
    )))
}

fn file_init_pre(ctx: &HookContext<'_>, _env: &Environment) -> Result<PreHookResult> {
    let path = ctx.arg_str(0)?;
    Ok(PreHookResult::Bypass(Some(
        HostObject::File(PathBuf::from(path)).into(),
    )))
}

/// `File.canRead()`
///
/// Hides the parent of the app data folder, which a sandboxed app cannot read on a real device.
fn file_can_read_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let HostObject::File(path) = ctx.this_object()? else {
        return Err(crate::Error::InvalidReceiver {
            signature: ctx.signature.to_string(),
            expected: "File",
        });
    };

    let package = &env.config().identity.package_name;
    let path = path.to_string_lossy();
    let hidden = path == format!("/data/data/{package}/..")
        || path == format!("\\data\\data\\{package}\\..")
        || path == "/data/data/"
        || path == "/data/data";

    if hidden {
        Ok(PreHookResult::Bypass(Some(JniValue::Boolean(false))))
    } else {
        Ok(PreHookResult::Continue)
    }
}
