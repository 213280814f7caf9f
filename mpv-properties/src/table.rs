//! The property catalogue
//!
//! Types follow what libmpv reports for each property. Names that are Rust
//! keywords get a trailing underscore on the accessor (`loop_`).

define_properties! {
    // Playback state
    pause: "pause", flag, rw;
    core_idle: "core-idle", flag, r;
    idle_active: "idle-active", flag, r;
    idle: "idle", str, rw;
    eof_reached: "eof-reached", flag, r;
    seeking: "seeking", flag, r;
    seekable: "seekable", flag, r;
    partially_seekable: "partially-seekable", flag, r;
    playback_abort: "playback-abort", flag, r;
    paused_for_cache: "paused-for-cache", flag, r;
    keep_open: "keep-open", str, rw;
    speed: "speed", float, rw;
    pitch: "pitch", float, rw;
    /// Loop count for the playlist: `inf`, `no` or a number
    loop_: "loop", str, rw;
    loop_file: "loop-file", str, rw;
    loop_playlist: "loop-playlist", str, rw;
    ab_loop_a: "ab-loop-a", str, rw;
    ab_loop_b: "ab-loop-b", str, rw;
    ab_loop_count: "ab-loop-count", str, rw;
    start: "start", str, rw;
    end: "end", str, rw;
    image_display_duration: "image-display-duration", float, rw;

    // Position and timing
    time_pos: "time-pos", float, rw;
    time_start: "time-start", float, r;
    time_remaining: "time-remaining", float, r;
    playtime_remaining: "playtime-remaining", float, r;
    playback_time: "playback-time", float, rw;
    percent_pos: "percent-pos", float, rw;
    duration: "duration", float, r;
    avsync: "avsync", float, r;
    total_avsync_change: "total-avsync-change", float, r;
    frame_drop_count: "frame-drop-count", int, r;
    decoder_frame_drop_count: "decoder-frame-drop-count", int, r;
    mistimed_frame_count: "mistimed-frame-count", int, r;
    vsync_ratio: "vsync-ratio", float, r;
    vo_delayed_frame_count: "vo-delayed-frame-count", int, r;
    estimated_frame_count: "estimated-frame-count", int, r;
    estimated_frame_number: "estimated-frame-number", int, r;

    // Current file
    path: "path", bytes, r;
    filename: "filename", bytes, r;
    media_title: "media-title", bytes, r;
    stream_open_filename: "stream-open-filename", bytes, rw;
    stream_path: "stream-path", bytes, r;
    file_format: "file-format", comma_list, r;
    file_size: "file-size", int, r;
    stream_pos: "stream-pos", int, rw;
    stream_end: "stream-end", int, r;
    metadata: "metadata", node_map, r;
    filtered_metadata: "filtered-metadata", node_map, r;
    chapter: "chapter", int, rw;
    chapters: "chapters", int, r;
    chapter_list: "chapter-list", node_array, r;
    chapter_metadata: "chapter-metadata", node_map, r;
    edition: "edition", int, rw;
    editions: "editions", int, r;
    edition_list: "edition-list", node_array, r;
    track_list: "track-list", node_array, r;
    title: "title", str, rw;

    // Playlist
    playlist: "playlist", node_array, r;
    playlist_pos: "playlist-pos", int, rw;
    playlist_pos_1: "playlist-pos-1", int, rw;
    playlist_current_pos: "playlist-current-pos", int, rw;
    playlist_playing_pos: "playlist-playing-pos", int, r;
    playlist_count: "playlist-count", int, r;

    // Cache and demuxer
    cache: "cache", str, rw;
    cache_secs: "cache-secs", float, rw;
    cache_pause: "cache-pause", flag, rw;
    cache_buffering_state: "cache-buffering-state", int, r;
    demuxer_cache_duration: "demuxer-cache-duration", float, r;
    demuxer_cache_idle: "demuxer-cache-idle", flag, r;
    demuxer_cache_state: "demuxer-cache-state", node_map, r;
    demuxer_max_bytes: "demuxer-max-bytes", str, rw;

    // Audio
    volume: "volume", float, rw;
    volume_max: "volume-max", float, rw;
    volume_gain: "volume-gain", float, rw;
    mute: "mute", flag, rw;
    ao_volume: "ao-volume", float, rw;
    ao_mute: "ao-mute", flag, rw;
    audio: "audio", str, rw;
    aid: "aid", str, rw;
    alang: "alang", str, rw;
    audio_delay: "audio-delay", float, rw;
    audio_display: "audio-display", str, rw;
    audio_codec: "audio-codec", str, r;
    audio_codec_name: "audio-codec-name", str, r;
    audio_params: "audio-params", node_map, r;
    audio_out_params: "audio-out-params", node_map, r;
    audio_bitrate: "audio-bitrate", float, r;
    audio_channels: "audio-channels", str, rw;
    audio_samplerate: "audio-samplerate", int, rw;
    audio_device: "audio-device", str, rw;
    audio_device_list: "audio-device-list", node_array, r;
    audio_exclusive: "audio-exclusive", flag, rw;
    audio_pitch_correction: "audio-pitch-correction", flag, rw;
    audio_file_auto: "audio-file-auto", str, rw;
    replaygain: "replaygain", str, rw;
    current_ao: "current-ao", str, r;
    ao: "ao", str, rw;
    af: "af", node_array, rw;

    // Video
    video: "video", str, rw;
    vid: "vid", str, rw;
    vo: "vo", str, rw;
    vf: "vf", node_array, rw;
    current_vo: "current-vo", str, r;
    vo_configured: "vo-configured", flag, r;
    vo_passes: "vo-passes", node_map, r;
    hwdec: "hwdec", str, rw;
    hwdec_current: "hwdec-current", str, r;
    hwdec_interop: "hwdec-interop", str, r;
    video_codec: "video-codec", str, r;
    video_format: "video-format", str, r;
    video_params: "video-params", node_map, r;
    video_out_params: "video-out-params", node_map, r;
    video_frame_info: "video-frame-info", node_map, r;
    video_bitrate: "video-bitrate", float, r;
    width: "width", int, r;
    height: "height", int, r;
    dwidth: "dwidth", int, r;
    dheight: "dheight", int, r;
    container_fps: "container-fps", float, r;
    estimated_vf_fps: "estimated-vf-fps", float, r;
    video_aspect_override: "video-aspect-override", str, rw;
    video_rotate: "video-rotate", str, rw;
    video_zoom: "video-zoom", float, rw;
    video_pan_x: "video-pan-x", float, rw;
    video_pan_y: "video-pan-y", float, rw;
    video_align_x: "video-align-x", float, rw;
    video_align_y: "video-align-y", float, rw;
    video_unscaled: "video-unscaled", str, rw;
    panscan: "panscan", float, rw;
    framedrop: "framedrop", str, rw;
    deinterlace: "deinterlace", str, rw;
    brightness: "brightness", int, rw;
    contrast: "contrast", int, rw;
    saturation: "saturation", int, rw;
    gamma: "gamma", int, rw;
    hue: "hue", int, rw;

    // Window and display
    fullscreen: "fullscreen", flag, rw;
    ontop: "ontop", flag, rw;
    border: "border", flag, rw;
    keepaspect: "keepaspect", flag, rw;
    snap_window: "snap-window", flag, rw;
    taskbar_progress: "taskbar-progress", flag, rw;
    window_scale: "window-scale", float, rw;
    window_minimized: "window-minimized", flag, r;
    window_maximized: "window-maximized", flag, rw;
    focused: "focused", flag, r;
    geometry: "geometry", str, rw;
    autofit: "autofit", str, rw;
    wid: "wid", int, rw;
    force_window: "force-window", str, rw;
    cursor_autohide: "cursor-autohide", str, rw;
    cursor_autohide_fs_only: "cursor-autohide-fs-only", flag, rw;
    display_names: "display-names", comma_list, r;
    display_fps: "display-fps", float, r;
    estimated_display_fps: "estimated-display-fps", float, r;
    display_hidpi_scale: "display-hidpi-scale", float, r;
    vsync_jitter: "vsync-jitter", float, r;

    // On-screen display
    osd_level: "osd-level", int, rw;
    osd_scale: "osd-scale", float, rw;
    osd_bar: "osd-bar", flag, rw;
    osd_duration: "osd-duration", int, rw;
    osd_font_size: "osd-font-size", float, rw;
    osd_width: "osd-width", int, r;
    osd_height: "osd-height", int, r;
    osd_par: "osd-par", float, r;
    osd_dimensions: "osd-dimensions", node_map, r;
    osc: "osc", flag, rw;

    // Subtitles
    sid: "sid", str, rw;
    secondary_sid: "secondary-sid", str, rw;
    slang: "slang", str, rw;
    sub_delay: "sub-delay", float, rw;
    sub_pos: "sub-pos", int, rw;
    sub_scale: "sub-scale", float, rw;
    sub_visibility: "sub-visibility", flag, rw;
    sub_forced_only: "sub-forced-only", str, rw;
    sub_ass_override: "sub-ass-override", str, rw;
    sub_auto: "sub-auto", str, rw;
    sub_font_size: "sub-font-size", float, rw;
    sub_color: "sub-color", str, rw;
    sub_codepage: "sub-codepage", str, rw;
    sub_text: "sub-text", str, r;
    sub_start: "sub-start", float, r;
    sub_end: "sub-end", float, r;
    sub_bitrate: "sub-bitrate", float, r;

    // Screenshots
    screenshot_format: "screenshot-format", str, rw;
    screenshot_directory: "screenshot-directory", str, rw;
    screenshot_template: "screenshot-template", str, rw;
    screenshot_jpeg_quality: "screenshot-jpeg-quality", int, rw;

    // Input and scripting
    input_default_bindings: "input-default-bindings", flag, rw;
    input_vo_keyboard: "input-vo-keyboard", flag, rw;
    input_ipc_server: "input-ipc-server", str, rw;
    input_bindings: "input-bindings", node_array, r;
    load_scripts: "load-scripts", flag, rw;
    ytdl: "ytdl", flag, rw;
    ytdl_format: "ytdl-format", str, rw;
    lavfi_complex: "lavfi-complex", str, rw;

    // Process and build information
    terminal: "terminal", flag, rw;
    really_quiet: "really-quiet", flag, rw;
    msg_level: "msg-level", str, rw;
    config: "config", flag, rw;
    save_position_on_quit: "save-position-on-quit", flag, rw;
    resume_playback: "resume-playback", flag, rw;
    pid: "pid", int, r;
    working_directory: "working-directory", bytes, r;
    mpv_version: "mpv-version", str, r;
    mpv_configuration: "mpv-configuration", str, r;
    ffmpeg_version: "ffmpeg-version", str, r;
    libass_version: "libass-version", int, r;
    protocol_list: "protocol-list", comma_list, r;
    decoder_list: "decoder-list", node_array, r;
    encoder_list: "encoder-list", node_array, r;
    demuxer_lavf_list: "demuxer-lavf-list", comma_list, r;
    profile_list: "profile-list", node_array, r;
    command_list: "command-list", node_array, r;
    property_list: "property-list", comma_list, r;
    options: "options", comma_list, r;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::MpvProperty;
    use crate::property::{Access, PropertyType};

    #[test]
    fn test_markers_match_rows() {
        assert_eq!(Loop::NAME, "loop");
        assert_eq!(OsdLevel::KIND, PropertyType::Int);
        assert_eq!(CoreIdle::ACCESS, Access::R);
        assert_eq!(PlaylistPos1::NAME, "playlist-pos-1");
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = ALL_PROPERTIES.iter().map(|p| p.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
