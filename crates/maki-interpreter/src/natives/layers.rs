// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Layers: plain bitmaps, pixel effects, frame animations and album art.

use super::gui::{set_region, set_region_from_map};
use super::{MethodEntry, NativeCall, call, forward, get, hook, methods, set, state_mismatch};
use crate::error::ObjectError;
use crate::runtime::instance::NativeState;
use crate::runtime::value::Value;

/// Playback status of an `AnimatedLayer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Frame state of an `AnimatedLayer`.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    pub start: i32,
    /// Last frame; unset means the bitmap's last frame.
    pub end: Option<i32>,
    pub current: i32,
    pub speed_ms: i32,
    pub auto_replay: bool,
    pub status: Playback,
}

pub(crate) fn layer() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onbeginresize" => hook(),
        "onendresize" => hook(),
        "fx_oninit" => hook(),
        "fx_onframe" => hook(),
        "fx_ongetpixelr" => call(fx_pixel_r),
        "fx_ongetpixeld" => call(fx_pixel_d),
        "fx_ongetpixelx" => call(fx_pixel_x),
        "fx_ongetpixely" => call(fx_pixel_y),
        "fx_ongetpixela" => call(fx_pixel_a),
        "setregionfrommap" => call(set_region_from_map),
        "setregion" => call(set_region),
        "fx_setenabled" => set("fxEnabled"),
        "fx_getenabled" => get("fxEnabled"),
        "fx_setwrap" => set("fxWrap"),
        "fx_getwrap" => get("fxWrap"),
        "fx_setrect" => set("fxRect"),
        "fx_getrect" => get("fxRect"),
        "fx_setbgfx" => set("fxBgFx"),
        "fx_getbgfx" => get("fxBgFx"),
        "fx_setclear" => set("fxClear"),
        "fx_getclear" => get("fxClear"),
        "fx_setspeed" => set("fxSpeed"),
        "fx_getspeed" => get("fxSpeed"),
        "fx_setrealtime" => set("fxRealtime"),
        "fx_getrealtime" => get("fxRealtime"),
        "fx_setlocalized" => set("fxLocalized"),
        "fx_getlocalized" => get("fxLocalized"),
        "fx_setbilinear" => set("fxBilinear"),
        "fx_getbilinear" => get("fxBilinear"),
        "fx_setalphamode" => set("fxAlphaMode"),
        "fx_getalphamode" => get("fxAlphaMode"),
        "fx_setgridsize" => forward("fx_setGridSize"),
        "fx_update" => forward("fx_update"),
        "fx_restart" => forward("fx_restart"),
    ]
}

// Without a script override the pixel callbacks leave the sample where it was.

fn fx_pixel_r(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(call.float(0)))
}

fn fx_pixel_d(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(call.float(1)))
}

fn fx_pixel_x(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(call.float(2)))
}

fn fx_pixel_y(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(call.float(3)))
}

fn fx_pixel_a(_call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Float(1.0))
}

// ============================================================================
// AnimatedLayer
// ============================================================================

pub(crate) fn animated_layer() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onplay" => hook(),
        "onpause" => hook(),
        "onresume" => hook(),
        "onstop" => hook(),
        "onframe" => hook(),
        "setspeed" => call(set_speed),
        "gotoframe" => call(goto_frame),
        "setstartframe" => call(set_start_frame),
        "setendframe" => call(set_end_frame),
        "setautoreplay" => call(set_auto_replay),
        "play" => call(play),
        "stop" => call(stop),
        "pause" => call(pause),
        "isplaying" => call(is_playing),
        "ispaused" => call(is_paused),
        "isstopped" => call(is_stopped),
        "getstartframe" => call(get_start_frame),
        "getendframe" => call(get_end_frame),
        "getlength" => call(get_length),
        "getdirection" => call(get_direction),
        "getautoreplay" => call(get_auto_replay),
        "getcurframe" => call(get_cur_frame),
        "setrealtime" => set("realtime"),
    ]
}

fn animation<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut AnimationState, ObjectError> {
    match call.state()? {
        NativeState::Animation(state) => Ok(state),
        _ => Err(state_mismatch("AnimatedLayer")),
    }
}

/// Frame count of the bitmap, as the host reports it.
fn frame_count(call: &mut NativeCall<'_>) -> Option<i32> {
    call.query("getLength", &[]).and_then(|v| v.as_i32())
}

fn end_frame(call: &mut NativeCall<'_>) -> Result<i32, ObjectError> {
    if let Some(end) = animation(call)?.end {
        return Ok(end);
    }
    Ok(frame_count(call).map_or(0, |n| (n - 1).max(0)))
}

fn set_speed(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let ms = call.int(0).max(0);
    animation(call)?.speed_ms = ms;
    call.mutate("speed", &[Value::Int(ms)]);
    Ok(Value::Void)
}

/// AnimatedLayer.gotoFrame(n) - Fires `onFrame(n)`.
fn goto_frame(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let frame = call.int(0).max(0);
    animation(call)?.current = frame;
    call.mutate("gotoFrame", &[Value::Int(frame)]);
    call.emit("onFrame", vec![Value::Int(frame)]);
    Ok(Value::Void)
}

fn set_start_frame(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let frame = call.int(0).max(0);
    animation(call)?.start = frame;
    Ok(Value::Void)
}

fn set_end_frame(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let frame = call.int(0);
    animation(call)?.end = (frame >= 0).then_some(frame);
    Ok(Value::Void)
}

fn set_auto_replay(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    animation(call)?.auto_replay = on;
    Ok(Value::Void)
}

/// AnimatedLayer.play() - Fires `onResume` when paused, `onPlay` otherwise.
fn play(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = animation(call)?;
    let event = match state.status {
        Playback::Playing => return Ok(Value::Void),
        Playback::Paused => "onResume",
        Playback::Stopped => {
            state.current = state.start;
            "onPlay"
        }
    };
    state.status = Playback::Playing;
    call.mutate("play", &[]);
    call.emit(event, Vec::new());
    Ok(Value::Void)
}

fn stop(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = animation(call)?;
    if state.status == Playback::Stopped {
        return Ok(Value::Void);
    }
    state.status = Playback::Stopped;
    state.current = state.start;
    call.mutate("stop", &[]);
    call.emit("onStop", Vec::new());
    Ok(Value::Void)
}

fn pause(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = animation(call)?;
    if state.status != Playback::Playing {
        return Ok(Value::Void);
    }
    state.status = Playback::Paused;
    call.mutate("pause", &[]);
    call.emit("onPause", Vec::new());
    Ok(Value::Void)
}

fn status_is(call: &mut NativeCall<'_>, status: Playback) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(animation(call)?.status == status))
}

fn is_playing(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    status_is(call, Playback::Playing)
}

fn is_paused(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    status_is(call, Playback::Paused)
}

fn is_stopped(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    status_is(call, Playback::Stopped)
}

fn get_start_frame(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(animation(call)?.start))
}

fn get_end_frame(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(end_frame(call)?))
}

/// AnimatedLayer.getLength() - Frames in the bitmap, or the configured
/// range when the host does not say.
fn get_length(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(n) = frame_count(call) {
        return Ok(Value::Int(n));
    }
    let state = animation(call)?;
    Ok(Value::Int(state.end.map_or(0, |end| end + 1)))
}

/// AnimatedLayer.getDirection() - 1 when playing forward, -1 backward.
fn get_direction(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let end = end_frame(call)?;
    let start = animation(call)?.start;
    Ok(Value::Int(if end >= start { 1 } else { -1 }))
}

fn get_auto_replay(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(animation(call)?.auto_replay))
}

fn get_cur_frame(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(animation(call)?.current))
}

// ============================================================================
// AlbumArtLayer
// ============================================================================

pub(crate) fn album_art_layer() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "refresh" => forward("refresh"),
        "isloading" => forward("isLoading"),
        "onalbumartloaded" => hook(),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    fn names(fx: &mut Fixture) -> Vec<String> {
        fx.events().into_iter().map(|(_, n)| n).collect()
    }

    #[test]
    fn test_playback_transitions() {
        let mut fx = Fixture::new();
        let anim = fx.create("AnimatedLayer");
        assert_eq!(fx.call(anim, "isStopped", &[]), Value::Boolean(true));
        fx.call(anim, "play", &[]);
        fx.call(anim, "play", &[]);
        fx.call(anim, "pause", &[]);
        assert_eq!(fx.call(anim, "isPaused", &[]), Value::Boolean(true));
        fx.call(anim, "play", &[]);
        fx.call(anim, "stop", &[]);
        fx.call(anim, "stop", &[]);
        assert_eq!(names(&mut fx), ["onPlay", "onPause", "onResume", "onStop"]);
    }

    #[test]
    fn test_frames() {
        let mut fx = Fixture::new();
        let anim = fx.create("AnimatedLayer");
        fx.call(anim, "setStartFrame", &[Value::Int(2)]);
        fx.call(anim, "setEndFrame", &[Value::Int(9)]);
        assert_eq!(fx.call(anim, "getLength", &[]), Value::Int(10));
        assert_eq!(fx.call(anim, "getDirection", &[]), Value::Int(1));
        fx.call(anim, "gotoFrame", &[Value::Int(5)]);
        assert_eq!(fx.call(anim, "getCurFrame", &[]), Value::Int(5));
        fx.call(anim, "play", &[]);
        assert_eq!(fx.call(anim, "getCurFrame", &[]), Value::Int(2));
        fx.call(anim, "setEndFrame", &[Value::Int(0)]);
        assert_eq!(fx.call(anim, "getDirection", &[]), Value::Int(-1));
    }

    #[test]
    fn test_pixel_callbacks_default_to_identity() {
        let mut fx = Fixture::new();
        let layer = fx.create("Layer");
        let args = [Value::Float(0.5), Value::Float(1.5), Value::Float(2.0), Value::Float(3.0)];
        assert_eq!(fx.call(layer, "fx_onGetPixelD", &args), Value::Float(1.5));
        assert_eq!(fx.call(layer, "fx_onGetPixelY", &args), Value::Float(3.0));
        assert_eq!(fx.call(layer, "fx_onGetPixelA", &args), Value::Float(1.0));
    }

    #[test]
    fn test_fx_flags_round_trip() {
        let mut fx = Fixture::new();
        let layer = fx.create("AnimatedLayer");
        fx.call(layer, "fx_setWrap", &[Value::Boolean(true)]);
        assert_eq!(fx.call(layer, "fx_getWrap", &[]), Value::Boolean(true));
        assert_eq!(fx.call(layer, "fx_getBilinear", &[]), Value::Boolean(false));
    }
}
