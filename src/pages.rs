//! Page selection and dispatch.
//!
//! A `Page` value selects what to render; `Dashboard::render` turns a
//! `PageRequest` into a `PageView` (a title plus ordered content blocks).
//! Only the monitoring page with `play` set touches the player and the
//! heatmap generator. Everything else is static content.

use anyhow::Result;
use rand::Rng;

use crate::detect::{ObjectCountSummary, REFERENCE_COUNTS};
use crate::frame::{DisplaySurface, Frame};
use crate::heatmap::interval_heatmaps;
use crate::insights::{live_crowd_count, Anomaly, AI_REPORT, HEATMAP_LEGEND};
use crate::player::{BoundedPlayer, PlaybackReport};

pub const PRESENTATION_FILE_NAME: &str = "Crowd_Monitoring_Presentation.pptx";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Home,
    About,
    RealTimeMonitoring,
    NxFeatures,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 4] = [
        Page::Home,
        Page::About,
        Page::RealTimeMonitoring,
        Page::NxFeatures,
    ];

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::RealTimeMonitoring => "Real-Time Monitoring",
            Page::NxFeatures => "Nx Features Used",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::RealTimeMonitoring => "real-time-monitoring",
            Page::NxFeatures => "nx-features",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.label() == label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Page,
    /// The "Play Video" control was pressed.
    pub play: bool,
}

impl PageRequest {
    pub fn new(page: Page) -> Self {
        Self { page, play: false }
    }

    pub fn with_play(page: Page) -> Self {
        Self { page, play: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Warning,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub caption: String,
}

impl ImageRef {
    fn asset(name: &str, caption: &str) -> Self {
        Self {
            src: format!("/assets/{}", name),
            caption: caption.to_string(),
        }
    }
}

/// Text and bullets beside an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub text: String,
    pub bullets: Vec<String>,
    pub image: ImageRef,
    pub image_first: bool,
}

#[derive(Clone, Debug)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Bullets(Vec<String>),
    Image(ImageRef),
    Section(Section),
    Rule,
    Download { href: String, label: String },
    PlayButton { href: String },
    Playback(PlaybackReport),
    Detected(String),
    CountCards(ObjectCountSummary),
    Heatmap { caption: &'static str, frame: Frame },
    Notice { kind: NoticeKind, text: String },
}

#[derive(Clone, Debug)]
pub struct PageView {
    pub page: Page,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl PageView {
    fn new(page: Page, title: &str) -> Self {
        Self {
            page,
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn heading(&mut self, text: &str) {
        self.push(Block::Heading(text.to_string()));
    }

    fn paragraph(&mut self, text: &str) {
        self.push(Block::Paragraph(text.to_string()));
    }
}

/// Renders pages. Holds the playback settings; owns no display state.
#[derive(Clone, Debug)]
pub struct Dashboard {
    player: BoundedPlayer,
    video_path: String,
}

impl Dashboard {
    pub fn new(player: BoundedPlayer, video_path: impl Into<String>) -> Self {
        Self {
            player,
            video_path: video_path.into(),
        }
    }

    pub fn player(&self) -> &BoundedPlayer {
        &self.player
    }

    pub fn video_path(&self) -> &str {
        &self.video_path
    }

    /// Run the player against the configured video into `display`.
    pub fn play<D: DisplaySurface + ?Sized>(&self, display: &mut D) -> Result<PlaybackReport> {
        self.player.play_path(&self.video_path, display)
    }

    pub fn render<D, R>(&self, request: PageRequest, display: &mut D, rng: &mut R) -> Result<PageView>
    where
        D: DisplaySurface + ?Sized,
        R: Rng + ?Sized,
    {
        let playback = if request.page == Page::RealTimeMonitoring && request.play {
            Some(self.play(display)?)
        } else {
            None
        };
        render_with_playback(request.page, playback, rng)
    }
}

/// Build `page` around a playback that already ran. Only the monitoring page
/// uses `playback`; `None` there means the video has not been played yet.
pub fn render_with_playback<R: Rng + ?Sized>(
    page: Page,
    playback: Option<PlaybackReport>,
    rng: &mut R,
) -> Result<PageView> {
    let view = match page {
        Page::Home => home_page(),
        Page::About => about_page(),
        Page::RealTimeMonitoring => monitoring_page(playback, rng)?,
        Page::NxFeatures => features_page(),
    };
    Ok(view)
}

fn monitoring_page<R: Rng + ?Sized>(
    playback: Option<PlaybackReport>,
    rng: &mut R,
) -> Result<PageView> {
    let page = Page::RealTimeMonitoring;
    let mut view = PageView::new(page, "📡 Live Crowd Monitoring");
    view.paragraph("Fetching real-time crowd count from Nx Meta...");
    view.paragraph(&format!(
        "Current crowd count: {}",
        live_crowd_count(rng)
    ));
    view.heading("🎥 Live Video Stream");
    view.push(Block::PlayButton {
        href: format!("/pages/{}?play=1", page.slug()),
    });
    let Some(report) = playback else {
        return Ok(view);
    };
    view.push(Block::Playback(report));

    let counts = REFERENCE_COUNTS;
    view.heading("📌 Detected Objects:");
    view.push(Block::Detected(counts.detected_labels()));
    view.heading("📊 Object Count Summary");
    view.push(Block::CountCards(counts));

    view.heading("🌡️ Crowd Flow Heatmaps for Different Time Intervals");
    view.paragraph(
        "The following heatmaps represent crowd density at different time intervals based on detected objects.",
    );
    for heatmap in interval_heatmaps(rng)? {
        view.push(Block::Heatmap {
            caption: heatmap.caption,
            frame: heatmap.frame,
        });
    }
    view.push(Block::Notice {
        kind: NoticeKind::Warning,
        text: HEATMAP_LEGEND.to_string(),
    });

    view.heading("🚨 Anomaly Detection");
    view.paragraph(
        "Analyzing heatmaps for unusual crowd movement patterns or high-density areas...",
    );
    let anomaly = Anomaly::simulate(rng);
    view.push(Block::Notice {
        kind: if anomaly.is_alert() {
            NoticeKind::Warning
        } else {
            NoticeKind::Success
        },
        text: anomaly.message(),
    });

    view.heading("🤖 AI-Driven Reports");
    view.paragraph("Generating AI-based insights based on crowd flow and object detection data...");
    view.push(Block::Bullets(
        AI_REPORT
            .iter()
            .map(|(heading, text)| format!("{}: {}", heading, text))
            .collect(),
    ));
    Ok(view)
}

fn section(title: &str, text: &str, bullets: &[&str], image: ImageRef, image_first: bool) -> Block {
    Block::Section(Section {
        title: title.to_string(),
        text: text.to_string(),
        bullets: bullets.iter().map(|b| b.to_string()).collect(),
        image,
        image_first,
    })
}

fn home_page() -> PageView {
    let mut view = PageView::new(Page::Home, "🏙️ Real-Time Crowd Monitoring");
    view.paragraph(
        "This application leverages AI-powered detection from Nx Meta to provide real-time insights on crowd \
         movement, density, and object tracking. Whether for security, event management, or traffic monitoring, \
         our tool helps enhance situational awareness.",
    );
    view.push(section(
        "🔍 Advanced AI-Powered Analysis",
        "Our solution integrates AI-driven object detection to monitor real-time crowd flow, identify potential \
         congestion zones, and provide actionable insights.",
        &[
            "📡 Live Object Detection & Counting",
            "🔥 Heatmap-Based Crowd Density Analysis",
            "🚦 Traffic & Crowd Movement Prediction",
        ],
        ImageRef::asset("image1.jpeg", "AI-Based Crowd Detection"),
        true,
    ));
    view.push(Block::Rule);
    view.push(section(
        "⚡ Real-Time Updates & Insights",
        "With seamless integration into Nx Meta's AI Manager, our system dynamically updates crowd statistics, \
         giving you an edge in decision-making for security, event management, and safety monitoring.",
        &[
            "📊 Live Streaming with AI Object Tracking",
            "🏢 Ideal for Smart Cities & Public Spaces",
            "📈 Data-Driven Decision Making",
        ],
        ImageRef::asset("image2.jpeg", "Live Object Tracking"),
        false,
    ));
    view.push(Block::Rule);
    view.push(section(
        "🌍 Scalable & Flexible Deployment",
        "Our system is built to handle different environments, from small events to large public spaces. The AI \
         model adapts to various conditions, ensuring accurate results in dynamic scenarios.",
        &[
            "🚀 Scalable Cloud & On-Prem Deployment",
            "🔄 Supports Multiple Camera Feeds",
            "🖥️ Intuitive & User-Friendly Interface",
        ],
        ImageRef::asset("image3.jpeg", "Crowd Density Heatmap"),
        true,
    ));
    view.push(Block::Rule);
    view.heading("Start Monitoring Now!");
    view.paragraph(
        "Leverage cutting-edge AI technology for real-time crowd monitoring. Our system ensures improved safety, \
         better event planning, and enhanced crowd management.",
    );
    view.push(Block::Image(ImageRef::asset(
        "image_detection.png",
        "Live Camera Feed",
    )));
    view
}

fn about_page() -> PageView {
    let mut view = PageView::new(Page::About, "📖 About This Project");
    view.paragraph("This project was developed for real-time crowd flow monitoring using the Nx Toolkit.");
    view.heading("Team Members:");
    view.push(Block::Bullets(vec![
        "Mohamed Salik S (Machine Learning Developer)".to_string(),
        "Mohamed Farhun M (Video Processing Specialist)".to_string(),
        "Venkatesan J (GenAI Developer)".to_string(),
    ]));
    view.paragraph("More details can be found in the presentation.");
    view.push(Block::Download {
        href: "/download/presentation".to_string(),
        label: "📥 Download PPT".to_string(),
    });
    view
}

fn features_page() -> PageView {
    let mut view = PageView::new(Page::NxFeatures, "🛠️ Nx Meta Features Used");
    view.paragraph(
        "Explore the powerful features of Nx Meta that make real-time crowd monitoring seamless, efficient, and \
         insightful. From AI-based detection to real-time analytics, here's a deep dive into the core functionalities.",
    );
    view.push(section(
        "🤖 Nx AI Manager",
        "The Nx AI Manager is at the heart of real-time object detection and crowd analysis. It integrates AI \
         models that detect and track people, vehicles, and other objects with high accuracy.",
        &[
            "📌 Advanced Object Detection",
            "🚶 People Counting & Tracking",
            "🌐 Seamless Integration with Nx Meta",
        ],
        ImageRef::asset("nx_ai_manager.jpeg", "Nx AI Manager"),
        true,
    ));
    view.push(section(
        "📦 Nx Model Manager",
        "The Nx Model Manager dynamically loads and configures AI models for detection tasks. It enables smooth \
         switching between different models based on scenarios, ensuring flexibility and accuracy.",
        &[
            "🔄 Dynamic Model Loading",
            "⚙️ Customizable Detection Parameters",
            "📈 Optimized Performance for Real-Time Analysis",
        ],
        ImageRef::asset("nx_model_manager.jpg", "Nx model manager"),
        false,
    ));
    view.push(section(
        "🛠️ Nx Metadata Injection",
        "This feature overlays real-time bounding boxes, heatmaps, and other metadata on video feeds, providing \
         enhanced situational awareness for monitoring and decision-making.",
        &[
            "🖼️ Real-Time Bounding Boxes & Annotations",
            "🔥 Heatmaps for Crowd Density",
            "📊 Contextual Insights with Metadata",
        ],
        ImageRef::asset("nx_rest_api.jpg", "Nx metadata injection"),
        true,
    ));
    view.push(section(
        "🌐 Nx REST APIs",
        "Nx REST APIs allow seamless integration with external systems, enabling real-time data fetching, \
         analysis, and action triggers based on crowd insights.",
        &[
            "⚡ Real-Time Data Access",
            "🔗 Integration with Third-Party Applications",
            "🛡️ Secure & Scalable API Endpoints",
        ],
        ImageRef::asset("nx_metadata_injection.jpg", "Nx rest API"),
        false,
    ));
    view
}

/// Sidebar user guide as (section title, [(topic, text)]).
pub const USER_GUIDE: [(&str, &[(&str, &str)]); 4] = [
    (
        "Getting Started",
        &[
            ("Run the Dashboard", "Start the `dashboard` binary and open the printed address in a browser."),
            ("Video Source", "Set DASHBOARD_VIDEO_PATH to the clip played on the monitoring page."),
        ],
    ),
    (
        "Real-Time Monitoring",
        &[
            ("Live Video Stream", "Press Play Video to stream the configured clip frame by frame."),
            ("Object Counts", "See count summaries for persons, backpacks, umbrellas and cars."),
            ("Heatmaps", "Compare crowd density heatmaps across four time intervals."),
        ],
    ),
    (
        "Analytics & Insights",
        &[
            ("Anomaly Detection", "Flags unusual crowd movement patterns or high-density areas."),
            ("AI-Driven Reports", "Summaries based on crowd flow and object detection data."),
        ],
    ),
    (
        "Feedback & Support",
        &[
            ("User Feedback", "Share your suggestions to help improve the dashboard."),
            ("Support", "Reach out for assistance with any queries or issues."),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DisplaySlot;
    use crate::player::{PlaybackOutcome, PlaybackPolicy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dashboard(path: &str) -> Dashboard {
        Dashboard::new(BoundedPlayer::new(500, PlaybackPolicy::Lenient), path)
    }

    #[test]
    fn slugs_and_labels_resolve() {
        for page in Page::ALL {
            assert_eq!(Page::from_slug(page.slug()), Some(page));
            assert_eq!(Page::from_label(page.label()), Some(page));
        }
        assert_eq!(Page::from_slug("settings"), None);
        assert_eq!(Page::default(), Page::Home);
    }

    #[test]
    fn static_pages_leave_display_untouched() {
        let dash = dashboard("stub://clip?frames=3&width=2&height=2");
        let mut slot = DisplaySlot::new();
        let mut rng = StdRng::seed_from_u64(0);
        for page in [Page::Home, Page::About, Page::NxFeatures] {
            let view = dash.render(PageRequest::new(page), &mut slot, &mut rng).unwrap();
            assert_eq!(view.page, page);
            assert!(!view.blocks.is_empty());
        }
        assert_eq!(slot.updates(), 0);
    }

    #[test]
    fn monitoring_without_play_only_offers_button() {
        let dash = dashboard("stub://clip?frames=3&width=2&height=2");
        let mut slot = DisplaySlot::new();
        let view = dash
            .render(
                PageRequest::new(Page::RealTimeMonitoring),
                &mut slot,
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap();
        assert!(view.blocks.iter().any(|b| matches!(b, Block::PlayButton { .. })));
        assert!(!view.blocks.iter().any(|b| matches!(b, Block::Heatmap { .. })));
        assert!(slot.current().is_none());
    }

    #[test]
    fn monitoring_with_play_runs_everything() {
        let dash = dashboard("stub://clip?frames=10&width=2&height=2");
        let mut slot = DisplaySlot::new();
        let view = dash
            .render(
                PageRequest::with_play(Page::RealTimeMonitoring),
                &mut slot,
                &mut StdRng::seed_from_u64(5),
            )
            .unwrap();

        let playback = view.blocks.iter().find_map(|b| match b {
            Block::Playback(report) => Some(*report),
            _ => None,
        });
        assert_eq!(
            playback,
            Some(PlaybackReport {
                frames_emitted: 10,
                outcome: PlaybackOutcome::Exhausted,
            })
        );
        assert_eq!(slot.updates(), 10);

        let heatmaps = view
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Heatmap { .. }))
            .count();
        assert_eq!(heatmaps, 4);
        assert!(view
            .blocks
            .iter()
            .any(|b| matches!(b, Block::Detected(line) if line == "person, backpack, umbrella, car")));
    }

    #[test]
    fn renders_from_an_existing_playback() {
        let report = PlaybackReport {
            frames_emitted: 7,
            outcome: PlaybackOutcome::Exhausted,
        };
        let view =
            render_with_playback(Page::RealTimeMonitoring, Some(report), &mut StdRng::seed_from_u64(2))
                .unwrap();
        assert!(view
            .blocks
            .iter()
            .any(|b| matches!(b, Block::Playback(r) if *r == report)));

        let idle =
            render_with_playback(Page::RealTimeMonitoring, None, &mut StdRng::seed_from_u64(2))
                .unwrap();
        assert!(!idle.blocks.iter().any(|b| matches!(b, Block::Playback(_))));

        let about = render_with_playback(Page::About, Some(report), &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(about.page, Page::About);
    }

    #[test]
    fn missing_video_still_renders_in_lenient_mode() {
        let dash = dashboard("/no/such/video.mp4");
        let mut slot = DisplaySlot::new();
        let view = dash
            .render(
                PageRequest::with_play(Page::RealTimeMonitoring),
                &mut slot,
                &mut StdRng::seed_from_u64(5),
            )
            .unwrap();
        assert!(view.blocks.iter().any(|b| matches!(
            b,
            Block::Playback(PlaybackReport {
                frames_emitted: 0,
                outcome: PlaybackOutcome::SourceUnavailable,
            })
        )));
    }
}
