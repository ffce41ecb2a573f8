use mediadupe::config::{Config, ExtraExtensions};
use mediadupe::duplicates::{DuplicateFinder, FinderConfig};
use mediadupe::scanner::{MediaCategory, WalkerConfig};
use tempfile::TempDir;

use super::fixtures::{tone, write_checkerboard_png, write_file, write_png, write_wav};

#[test]
fn test_identical_images_grouped_and_corrupt_image_skipped() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "broken.jpg", b"\xff\xd8 definitely not a jpeg");
    for name in ["p1.png", "p2.png", "p3.png"] {
        write_png(&dir.path().join(name), 64);
    }

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    let group = &result.groups()[0];
    assert_eq!(group.category(), MediaCategory::Image);
    assert_eq!(group.len(), 3);
    assert_eq!(group.fingerprint.value.len(), 16);

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, dir.path().join("broken.jpg"));
    assert_eq!(summary.skipped[0].category, MediaCategory::Image);
    assert_eq!(summary.fingerprinted.image, 3);
    assert!(summary.has_problems());
}

#[test]
fn test_reencoded_image_matches_original() {
    let dir = TempDir::new().unwrap();
    let rgb = image::RgbImage::from_fn(48, 48, |x, y| image::Rgb([(x * 5) as u8, (y * 5) as u8, 90]));
    rgb.save(dir.path().join("rgb.png")).unwrap();
    image::DynamicImage::ImageRgb8(rgb)
        .to_rgba8()
        .save(dir.path().join("rgba.png"))
        .unwrap();

    let (result, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.groups()[0].paths(),
        vec![dir.path().join("rgb.png"), dir.path().join("rgba.png")]
    );
}

#[test]
fn test_different_images_not_grouped() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("gradient.png"), 0);
    write_checkerboard_png(&dir.path().join("checker.png"));

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.fingerprinted.image, 2);
}

#[test]
fn test_audio_duplicates_grouped_by_mfcc() {
    let dir = TempDir::new().unwrap();
    let a440 = tone(440.0, 8000, 8000);
    write_wav(&dir.path().join("a.wav"), &a440, 8000);
    write_wav(&dir.path().join("b.wav"), &a440, 8000);
    write_wav(&dir.path().join("c.wav"), &tone(1500.0, 8000, 8000), 8000);

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    let group = &result.groups()[0];
    assert_eq!(group.category(), MediaCategory::Audio);
    assert_eq!(
        group.paths(),
        vec![dir.path().join("a.wav"), dir.path().join("b.wav")]
    );
    // 13 coefficients, 4 bytes each
    assert_eq!(group.fingerprint.value.len(), 13 * 8);
    assert_eq!(summary.fingerprinted.audio, 3);
}

#[test]
fn test_silent_audio_track_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_wav(&dir.path().join("empty.wav"), &[], 8000);
    write_wav(&dir.path().join("ok.wav"), &tone(300.0, 8000, 4000), 8000);

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.fingerprinted.audio, 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, dir.path().join("empty.wav"));
    assert_eq!(summary.skipped[0].category, MediaCategory::Audio);
}

#[test]
fn test_identical_bytes_in_different_categories_not_grouped() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("picture.png"), 10);
    std::fs::copy(dir.path().join("picture.png"), dir.path().join("picture.bin")).unwrap();
    write_wav(&dir.path().join("sound.wav"), &tone(220.0, 8000, 4000), 8000);
    std::fs::copy(dir.path().join("sound.wav"), dir.path().join("sound.dat")).unwrap();

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.fingerprinted.generic, 2);
    assert_eq!(summary.fingerprinted.image, 1);
    assert_eq!(summary.fingerprinted.audio, 1);
}

#[test]
fn test_extra_extensions_route_to_media_strategy() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("one.pic"), 30);
    write_png(&dir.path().join("two.pic"), 30);

    let config = Config {
        extra_extensions: ExtraExtensions {
            image: vec!["PIC".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(config.walker_config()));
    let (result, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.groups()[0].category(), MediaCategory::Image);
    assert_eq!(summary.fingerprinted.image, 2);

    // Without the extra mapping the same files are generic
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(WalkerConfig::default()));
    let (result, _) = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(result.groups()[0].category(), MediaCategory::Generic);
}

#[test]
fn test_video_without_ffmpeg_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "clip1.mp4", b"same bytes");
    write_file(dir.path(), "clip2.mp4", b"same bytes");

    let finder = DuplicateFinder::new(
        FinderConfig::default().with_ffmpeg_path(dir.path().join("missing-ffmpeg")),
    );
    let (result, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.skipped.len(), 2);
    assert!(summary
        .skipped
        .iter()
        .all(|s| s.category == MediaCategory::Video));
}

#[cfg(unix)]
#[test]
fn test_videos_with_same_first_frame_are_grouped() {
    let tools = TempDir::new().unwrap();
    // Frame depends only on whether the input name starts with "intro"
    let ffmpeg = super::fixtures::fake_ffmpeg(
        tools.path(),
        r#"case "$(basename "$5")" in intro*) printf 'frame-A' ;; *) printf 'frame-B' ;; esac"#,
    );

    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "intro_720p.mkv", b"first encoding");
    write_file(dir.path(), "intro_1080p.mp4", b"second, different encoding");
    write_file(dir.path(), "outro.avi", b"third");

    let finder = DuplicateFinder::new(FinderConfig::default().with_ffmpeg_path(ffmpeg));
    let (result, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.len(), 1);
    let group = &result.groups()[0];
    assert_eq!(group.category(), MediaCategory::Video);
    assert_eq!(
        group.paths(),
        vec![
            dir.path().join("intro_1080p.mp4"),
            dir.path().join("intro_720p.mkv"),
        ]
    );
    assert_eq!(summary.fingerprinted.video, 3);
}
