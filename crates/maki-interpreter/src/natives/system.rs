// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The System object: string, math and date helpers, settings, atoms, and
//! the player services the host provides.
//!
//! Dates are `time_t` seconds interpreted in local time, and the
//! `getDate*` accessors return `struct tm` fields as-is: years since 1900,
//! zero-based months and days of the year, Sunday as day 0.

use chrono::{DateTime, Datelike, Local, Offset, TimeZone, Timelike};
use rand::Rng;
use tracing::info;

use super::{MethodEntry, NativeCall, call, hook, methods, service};
use crate::error::ObjectError;
use crate::host::ElementId;
use crate::runtime::value::Value;

/// Version reported by `getRuntimeVersion`.
pub const RUNTIME_VERSION: f64 = 5.666;

/// Element id the host gives the main browser window.
const MAIN_BROWSER: &str = "main.browser";

pub(crate) fn system() -> Vec<(&'static str, MethodEntry)> {
    methods![
        // Events
        "onscriptloaded" => hook(),
        "onscriptunloading" => hook(),
        "onquit" => hook(),
        "onsetxuiparam" => hook(),
        "onkeydown" => hook(),
        "onaccelerator" => hook(),
        "oncreatelayout" => hook(),
        "onshowlayout" => hook(),
        "onhidelayout" => hook(),
        "onstop" => hook(),
        "onplay" => hook(),
        "onpause" => hook(),
        "onresume" => hook(),
        "ontitlechange" => hook(),
        "ontitle2change" => hook(),
        "oninfochange" => hook(),
        "onstatusmsg" => hook(),
        "oneqbandchanged" => hook(),
        "oneqpreampchanged" => hook(),
        "oneqchanged" => hook(),
        "oneqfreqchanged" => hook(),
        "onvolumechanged" => hook(),
        "onseek" => hook(),
        "onlookforcomponent" => hook(),
        "ongetcancelcomponent" => hook(),
        "onshownotification" => hook(),
        // Containers and windows
        "getcontainer" => call(get_container),
        "newdynamiccontainer" => call(new_dynamic_container),
        "newgroup" => call(new_group),
        "newgroupaslayout" => call(new_group_as_layout),
        "getnumcontainers" => call(get_num_containers),
        "enumcontainer" => call(enum_container),
        "getwac" => call(get_container),
        "getscriptgroup" => call(get_script_group),
        "getmainbrowser" => call(get_main_browser),
        "popmainbrowser" => service("popMainBrowser"),
        "navigateurl" => service("navigateUrl"),
        "showwindow" => call(show_window),
        "hidewindow" => call(hide_window),
        "hidenamedwindow" => service("hideNamedWindow"),
        "isnamedwindowvisible" => service("isNamedWindowVisible"),
        "messagebox" => service("messageBox"),
        "getparam" => call(get_param),
        // Player
        "getplayitemstring" => service("getPlayItemString"),
        "getplayitemlength" => service("getPlayItemLength"),
        "getplayitemmetadatastring" => service("getPlayItemMetaDataString"),
        "getplayitemdisplaytitle" => service("getPlayItemDisplayTitle"),
        "getextfamily" => service("getExtFamily"),
        "getplaylistlength" => service("getPlaylistLength"),
        "getplaylistindex" => service("getPlaylistIndex"),
        "getsonginfotext" => service("getSongInfoText"),
        "getvisband" => service("getVisBand"),
        "getleftvumeter" => service("getLeftVuMeter"),
        "getrightvumeter" => service("getRightVuMeter"),
        "getvolume" => call(get_volume),
        "setvolume" => call(set_volume),
        "play" => service("play"),
        "stop" => service("stop"),
        "pause" => service("pause"),
        "next" => service("next"),
        "previous" => service("previous"),
        "eject" => service("eject"),
        "seekto" => service("seekTo"),
        "getposition" => service("getPosition"),
        "playfile" => service("playFile"),
        "seteqband" => call(set_eq_band),
        "seteqpreamp" => call(set_eq_preamp),
        "seteq" => call(set_eq),
        "geteqband" => call(get_eq_band),
        "geteqpreamp" => call(get_eq_preamp),
        "geteq" => call(get_eq),
        "getbalance" => call(get_balance),
        "setbalance" => call(set_balance),
        // Strings
        "getextension" => call(get_extension),
        "gettoken" => call(get_token),
        "integertostring" => call(integer_to_string),
        "stringtointeger" => call(string_to_integer),
        "floattostring" => call(float_to_string),
        "stringtofloat" => call(string_to_float),
        "integertolongtime" => call(integer_to_long_time),
        "integertotime" => call(integer_to_time),
        "strmid" => call(strmid),
        "strleft" => call(strleft),
        "strright" => call(strright),
        "strsearch" => call(strsearch),
        "strlen" => call(strlen),
        "strupper" => call(strupper),
        "strlower" => call(strlower),
        "urlencode" => call(url_encode),
        "removepath" => call(remove_path),
        "getpath" => call(get_path),
        "chr" => call(chr),
        // Dates
        "datetotime" => call(date_to_time),
        "datetolongtime" => call(date_to_long_time),
        "formatdate" => call(format_date),
        "formatlongdate" => call(format_long_date),
        "getdateyear" => call(get_date_year),
        "getdatemonth" => call(get_date_month),
        "getdateday" => call(get_date_day),
        "getdatedow" => call(get_date_dow),
        "getdatedoy" => call(get_date_doy),
        "getdatehour" => call(get_date_hour),
        "getdatemin" => call(get_date_min),
        "getdatesec" => call(get_date_sec),
        "getdatedst" => call(get_date_dst),
        "getdate" => call(get_date),
        "gettimeofday" => call(get_time_of_day),
        // Settings and atoms
        "setprivatestring" => call(set_private_string),
        "setprivateint" => call(set_private_int),
        "getprivatestring" => call(get_private_string),
        "getprivateint" => call(get_private_int),
        "setpublicstring" => call(set_public_string),
        "setpublicint" => call(set_public_int),
        "getpublicstring" => call(get_public_string),
        "getpublicint" => call(get_public_int),
        "setatom" => call(set_atom),
        "getatom" => call(get_atom),
        // Desktop
        "getmouseposx" => service("getMousePosX"),
        "getmouseposy" => service("getMousePosY"),
        "getviewportwidth" => service("getViewportWidth"),
        "getviewportheight" => service("getViewportHeight"),
        "getviewportleft" => service("getViewportLeft"),
        "getviewporttop" => service("getViewportTop"),
        "getviewportwidthfrompoint" => service("getViewportWidthFromPoint"),
        "getviewportheightfrompoint" => service("getViewportHeightFromPoint"),
        "getviewportleftfrompoint" => service("getViewportLeftFromPoint"),
        "getviewporttopfrompoint" => service("getViewportTopFromPoint"),
        "getcurappleft" => service("getCurAppLeft"),
        "getcurapptop" => service("getCurAppTop"),
        "getcurappwidth" => service("getCurAppWidth"),
        "getcurappheight" => service("getCurAppHeight"),
        "isappactive" => service("isAppActive"),
        "getskinname" => service("getSkinName"),
        "switchskin" => service("switchSkin"),
        "isloadingskin" => service("isLoadingSkin"),
        "lockui" => service("lockUI"),
        "unlockui" => service("unlockUI"),
        "setmenutransparency" => service("setMenuTransparency"),
        "getstatus" => service("getStatus"),
        "iskeydown" => service("isKeyDown"),
        "setclipboardtext" => service("setClipboardText"),
        "selectfile" => service("selectFile"),
        "systemmenu" => service("systemMenu"),
        "windowmenu" => service("windowMenu"),
        "triggeraction" => service("triggerAction"),
        "ddesend" => service("ddeSend"),
        "invokedebugger" => service("invokeDebugger"),
        "isvideo" => service("isVideo"),
        "isvideofullscreen" => service("isVideoFullscreen"),
        "getidealvideowidth" => service("getIdealVideoWidth"),
        "getidealvideoheight" => service("getIdealVideoHeight"),
        "isminimized" => service("isMinimized"),
        "minimizeapplication" => service("minimizeApplication"),
        "restoreapplication" => service("restoreApplication"),
        "activateapplication" => service("activateApplication"),
        "isdesktopalphaavailable" => service("isDesktopAlphaAvailable"),
        "istransparencyavailable" => service("isTransparencyAvailable"),
        "debugstring" => call(debug_string),
        "getruntimeversion" => call(get_runtime_version),
        "isobjectvalid" => call(is_object_valid),
        // Math
        "integer" => call(integer),
        "frac" => call(frac),
        "sin" => call(sin),
        "cos" => call(cos),
        "tan" => call(tan),
        "asin" => call(asin),
        "acos" => call(acos),
        "atan" => call(atan),
        "atan2" => call(atan2),
        "pow" => call(pow),
        "sqr" => call(sqr),
        "sqrt" => call(sqrt),
        "random" => call(random),
    ]
}

// ============================================================================
// Containers and windows
// ============================================================================

fn get_container(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    Ok(call.find(ElementId::SYSTEM, &id).into())
}

fn create(call: &mut NativeCall<'_>, class: &str) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    Ok(call.create_element(class, &id, None).into())
}

/// System.newDynamicContainer(id) - The container reports `isDynamic() == 1`.
fn new_dynamic_container(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let created = create(call, "Container")?;
    if let Some(instance) = created.as_object().and_then(|r| call.model().instance_mut(r)) {
        instance.set_field("dynamic", Value::Int(1));
    }
    Ok(created)
}

fn new_group(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    create(call, "Group")
}

fn new_group_as_layout(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    create(call, "Layout")
}

fn get_num_containers(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let count = call.children_of_class(ElementId::SYSTEM, "Container").len();
    Ok(Value::Int(count as i32))
}

fn enum_container(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let n = call.int(0);
    let containers = call.children_of_class(ElementId::SYSTEM, "Container");
    Ok(nth(&containers, n).into())
}

fn get_script_group(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call.script_group().into())
}

fn get_main_browser(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call.find(ElementId::SYSTEM, MAIN_BROWSER).into())
}

fn show_window(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let args = [call.arg(0).clone(), call.arg(1).clone(), call.arg(2).clone()];
    call.mutate_element(ElementId::SYSTEM, "showWindow", &args);
    let id = call.string(0).to_string();
    Ok(call.find(ElementId::SYSTEM, &id).into())
}

fn hide_window(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(element) = call.object(0).and_then(|r| call.element_of(r)) {
        call.mutate_element(element, "hide", &[]);
    }
    Ok(Value::Void)
}

fn get_param(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(param) = call.query_element(ElementId::SYSTEM, "param", &[]) {
        return Ok(param);
    }
    Ok(call.field_or("param", ""))
}

pub(crate) fn nth<T: Copy>(items: &[T], n: i32) -> Option<T> {
    usize::try_from(n).ok().and_then(|n| items.get(n)).copied()
}

// ============================================================================
// Player state
// ============================================================================

/// Reads an application property: host first, then the stored copy.
fn app_property(call: &mut NativeCall<'_>, property: &str, args: &[Value], default: Value) -> Value {
    call.query_element(ElementId::SYSTEM, property, args)
        .or_else(|| call.field(property).cloned())
        .unwrap_or(default)
}

fn store_and_notify(call: &mut NativeCall<'_>, property: &str, value: Value, event: &str, args: Vec<Value>) {
    call.set_field(property, value.clone());
    call.mutate_element(ElementId::SYSTEM, property, &[value]);
    call.emit(event, args);
}

fn get_volume(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(app_property(call, "volume", &[], Value::Int(255)))
}

fn set_volume(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let volume = call.int(0).clamp(0, 255);
    store_and_notify(call, "volume", Value::Int(volume), "onVolumeChanged", vec![Value::Int(volume)]);
    Ok(Value::Void)
}

fn set_eq_band(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let band = call.int(0).clamp(0, 9);
    let value = call.int(1).clamp(-127, 127);
    call.set_field(format!("eqBand{band}"), value);
    call.mutate_element(ElementId::SYSTEM, "eqBand", &[Value::Int(band), Value::Int(value)]);
    call.emit("onEqBandChanged", vec![Value::Int(band), Value::Int(value)]);
    Ok(Value::Void)
}

fn get_eq_band(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let band = call.int(0).clamp(0, 9);
    if let Some(v) = call.query_element(ElementId::SYSTEM, "eqBand", &[Value::Int(band)]) {
        return Ok(v);
    }
    Ok(call.field_or(&format!("eqBand{band}"), 0))
}

fn set_eq_preamp(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let value = call.int(0).clamp(-127, 127);
    store_and_notify(call, "eqPreamp", Value::Int(value), "onEqPreampChanged", vec![Value::Int(value)]);
    Ok(Value::Void)
}

fn get_eq_preamp(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(app_property(call, "eqPreamp", &[], Value::Int(0)))
}

fn set_eq(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = i32::from(call.int(0) != 0);
    store_and_notify(call, "eq", Value::Int(on), "onEqChanged", vec![Value::Int(on)]);
    Ok(Value::Void)
}

fn get_eq(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(app_property(call, "eq", &[], Value::Int(0)))
}

fn get_balance(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(app_property(call, "balance", &[], Value::Int(0)))
}

fn set_balance(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let balance = call.int(0).clamp(-127, 127);
    call.set_field("balance", balance);
    call.mutate_element(ElementId::SYSTEM, "balance", &[Value::Int(balance)]);
    Ok(Value::Void)
}

// ============================================================================
// Strings
// ============================================================================

fn string_result(s: impl Into<String>) -> Result<Value, ObjectError> {
    Ok(Value::String(s.into()))
}

/// Characters `start..start + len` of `s`, clamped to the string.
fn char_slice(s: &str, start: i32, len: Option<i32>) -> String {
    let start = usize::try_from(start).unwrap_or(0);
    let chars = s.chars().skip(start);
    match len {
        Some(len) => chars.take(usize::try_from(len).unwrap_or(0)).collect(),
        None => chars.collect(),
    }
}

fn last_separator(path: &str) -> Option<usize> {
    path.rfind(['/', '\\'])
}

/// System.getExtension(file) - Extension of the last path component, without the dot.
fn get_extension(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let file = call.string(0);
    let name = last_separator(file).map_or(file, |i| &file[i + 1..]);
    string_result(name.rfind('.').map_or("", |i| &name[i + 1..]))
}

/// System.getToken(str, separator, tokennum) - The nth separator-delimited token.
fn get_token(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (s, sep, n) = (call.string(0), call.string(1), call.int(2));
    let token = if sep.is_empty() {
        (n == 0).then_some(s)
    } else {
        usize::try_from(n).ok().and_then(|n| s.split(sep).nth(n))
    };
    string_result(token.unwrap_or(""))
}

fn integer_to_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    string_result(call.int(0).to_string())
}

/// Parses the longest numeric prefix, the way `atof` does.
pub(crate) fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

fn string_to_integer(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(leading_number(call.string(0)) as i32))
}

fn float_to_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let digits = usize::try_from(call.int(1).clamp(0, 16)).unwrap_or(0);
    string_result(format!("{:.*}", digits, call.float(0)))
}

fn string_to_float(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(leading_number(call.string(0))))
}

/// System.integerToTime(ms) - `m:ss`.
fn integer_to_time(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let secs = call.int(0).max(0) / 1000;
    string_result(format!("{}:{:02}", secs / 60, secs % 60))
}

/// System.integerToLongTime(ms) - `h:mm:ss`.
fn integer_to_long_time(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let secs = call.int(0).max(0) / 1000;
    string_result(format!(
        "{}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    ))
}

fn strmid(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    string_result(char_slice(call.string(0), call.int(1), Some(call.int(2))))
}

fn strleft(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    string_result(char_slice(call.string(0), 0, Some(call.int(1))))
}

fn strright(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let s = call.string(0);
    let n = call.int(1).max(0);
    let len = s.chars().count() as i32;
    string_result(char_slice(s, (len - n).max(0), None))
}

/// System.strsearch(str, substr) - Character index of `substr`, or -1.
fn strsearch(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (s, needle) = (call.string(0), call.string(1));
    let index = s
        .find(needle)
        .map_or(-1, |byte| s[..byte].chars().count() as i32);
    Ok(Value::Int(index))
}

fn strlen(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(call.string(0).chars().count() as i32))
}

fn strupper(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    string_result(call.string(0).to_uppercase())
}

fn strlower(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    string_result(call.string(0).to_lowercase())
}

fn url_encode(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    string_result(urlencoding::encode(call.string(0)).into_owned())
}

fn remove_path(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = call.string(0);
    string_result(last_separator(path).map_or(path, |i| &path[i + 1..]))
}

fn get_path(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = call.string(0);
    string_result(last_separator(path).map_or("", |i| &path[..i]))
}

fn chr(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let c = u32::try_from(call.int(0)).ok().and_then(char::from_u32);
    string_result(c.map(String::from).unwrap_or_default())
}

// ============================================================================
// Dates
// ============================================================================

fn local_time(call: &NativeCall<'_>) -> Option<DateTime<Local>> {
    Local.timestamp_opt(i64::from(call.int(0)), 0).single()
}

fn date_field(
    call: &mut NativeCall<'_>,
    f: impl FnOnce(&DateTime<Local>) -> i32,
) -> Result<Value, ObjectError> {
    Ok(Value::Int(local_time(call).map_or(0, |t| f(&t))))
}

fn date_format(call: &mut NativeCall<'_>, format: &str) -> Result<Value, ObjectError> {
    string_result(
        local_time(call)
            .map(|t| t.format(format).to_string())
            .unwrap_or_default(),
    )
}

fn date_to_time(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_format(call, "%H:%M")
}

fn date_to_long_time(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_format(call, "%H:%M:%S")
}

fn format_date(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_format(call, "%m/%d/%y")
}

fn format_long_date(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_format(call, "%A, %B %d, %Y")
}

fn get_date_year(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.year() - 1900)
}

fn get_date_month(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.month0() as i32)
}

fn get_date_day(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.day() as i32)
}

fn get_date_dow(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.weekday().num_days_from_sunday() as i32)
}

fn get_date_doy(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.ordinal0() as i32)
}

fn get_date_hour(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.hour() as i32)
}

fn get_date_min(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.minute() as i32)
}

fn get_date_sec(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| t.second() as i32)
}

/// Daylight saving is in effect when the offset exceeds the smaller of the
/// January and July offsets of the same year.
fn get_date_dst(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    date_field(call, |t| {
        let offset_at = |month: u32| {
            Local
                .with_ymd_and_hms(t.year(), month, 1, 12, 0, 0)
                .single()
                .map(|d| d.offset().fix().local_minus_utc())
        };
        let standard = match (offset_at(1), offset_at(7)) {
            (Some(jan), Some(jul)) => jan.min(jul),
            _ => return 0,
        };
        i32::from(t.offset().fix().local_minus_utc() > standard)
    })
}

fn get_date(_call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(Local::now().timestamp() as i32))
}

/// System.getTimeOfDay() - Milliseconds since local midnight.
fn get_time_of_day(_call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let now = Local::now();
    let ms = now.num_seconds_from_midnight() * 1000 + now.timestamp_subsec_millis();
    Ok(Value::Int(ms as i32))
}

// ============================================================================
// Settings and atoms
// ============================================================================

fn private_key(call: &NativeCall<'_>) -> String {
    format!("private.{}.{}", call.string(0), call.string(1))
}

fn public_key(call: &NativeCall<'_>) -> String {
    format!("public.{}", call.string(0))
}

/// Stores a setting and offers it to the host for persistence.
fn store_setting(call: &mut NativeCall<'_>, key: String, value: Value, action: &str, args: Vec<Value>) {
    call.set_field(key, value);
    call.mutate_element(ElementId::SYSTEM, action, &args);
}

/// Stored value, else the host's persisted value, else the script's default.
fn load_setting(call: &mut NativeCall<'_>, key: &str, action: &str, args: Vec<Value>, default: Value) -> Value {
    if let Some(v) = call.field(key) {
        return v.clone();
    }
    call.query_element(ElementId::SYSTEM, action, &args)
        .unwrap_or(default)
}

fn set_private_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = private_key(call);
    let value = call.arg(2).clone();
    let args = vec![call.arg(0).clone(), call.arg(1).clone(), value.clone()];
    store_setting(call, key, value, "setPrivateString", args);
    Ok(Value::Void)
}

fn set_private_int(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = private_key(call);
    let value = call.arg(2).clone();
    let args = vec![call.arg(0).clone(), call.arg(1).clone(), value.clone()];
    store_setting(call, key, value, "setPrivateInt", args);
    Ok(Value::Void)
}

fn get_private_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = private_key(call);
    let args = vec![call.arg(0).clone(), call.arg(1).clone()];
    let default = call.arg(2).clone();
    let v = load_setting(call, &key, "getPrivateString", args, default);
    string_result(v.to_string())
}

fn get_private_int(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = private_key(call);
    let args = vec![call.arg(0).clone(), call.arg(1).clone()];
    let default = call.arg(2).clone();
    Ok(as_int(load_setting(call, &key, "getPrivateInt", args, default)))
}

fn set_public_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = public_key(call);
    let value = call.arg(1).clone();
    let args = vec![call.arg(0).clone(), value.clone()];
    store_setting(call, key, value, "setPublicString", args);
    Ok(Value::Void)
}

fn set_public_int(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = public_key(call);
    let value = call.arg(1).clone();
    let args = vec![call.arg(0).clone(), value.clone()];
    store_setting(call, key, value, "setPublicInt", args);
    Ok(Value::Void)
}

fn get_public_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = public_key(call);
    let args = vec![call.arg(0).clone()];
    let default = call.arg(1).clone();
    let v = load_setting(call, &key, "getPublicString", args, default);
    string_result(v.to_string())
}

fn get_public_int(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = public_key(call);
    let args = vec![call.arg(0).clone()];
    let default = call.arg(1).clone();
    Ok(as_int(load_setting(call, &key, "getPublicInt", args, default)))
}

fn as_int(v: Value) -> Value {
    match v {
        Value::String(s) => Value::Int(leading_number(&s) as i32),
        other => Value::Int(other.as_i32().unwrap_or(0)),
    }
}

fn atom_key(call: &NativeCall<'_>) -> String {
    format!("atom.{}", call.string(0).to_ascii_lowercase())
}

fn set_atom(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = atom_key(call);
    let value = call.arg(1).clone();
    call.set_field(key, value);
    Ok(Value::Void)
}

fn get_atom(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call.object_field(&atom_key(call)).into())
}

// ============================================================================
// Diagnostics
// ============================================================================

fn debug_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    info!(target: "maki::script", severity = call.int(1), "{}", call.string(0));
    Ok(Value::Void)
}

fn get_runtime_version(_call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(RUNTIME_VERSION))
}

fn is_object_valid(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(call.object(0).is_some()))
}

// ============================================================================
// Math
// ============================================================================

fn math(call: &mut NativeCall<'_>, f: fn(f64) -> f64) -> Result<Value, ObjectError> {
    Ok(Value::Float(f(call.float(0))))
}

fn integer(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(call.float(0).trunc() as i32))
}

fn frac(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::fract)
}

fn sin(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::sin)
}

fn cos(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::cos)
}

fn tan(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::tan)
}

fn asin(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::asin)
}

fn acos(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::acos)
}

fn atan(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::atan)
}

fn atan2(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(call.float(0).atan2(call.float(1))))
}

fn pow(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(call.float(0).powf(call.float(1))))
}

fn sqr(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, |x| x * x)
}

fn sqrt(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    math(call, f64::sqrt)
}

/// System.random(max) - Uniform integer in `0..max`; 0 when `max` is not positive.
fn random(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let max = call.int(0);
    if max <= 0 {
        return Ok(Value::Int(0));
    }
    Ok(Value::Int(call.model().rng().gen_range(0..max)))
}
