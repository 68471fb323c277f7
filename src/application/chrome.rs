use time::OffsetDateTime;

use crate::application::render::LinkTarget;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, PageMetaView,
};

const NAVIGATION: [(&str, &str); 3] = [("home", "/"), ("about", "/about"), ("contact", "/contact")];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
}

/// Site-wide identity shown in every page's header and footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteProfile {
    pub title: String,
    pub owner: String,
    pub description: String,
    pub social: Vec<SocialLink>,
    pub source_url: Option<String>,
}

#[derive(Clone)]
pub struct ChromeService {
    profile: SiteProfile,
}

impl ChromeService {
    pub fn new(profile: SiteProfile) -> Self {
        Self { profile }
    }

    pub fn load(&self) -> LayoutChrome {
        self.load_for_year(OffsetDateTime::now_utc().year())
    }

    pub fn load_for_year(&self, year: i32) -> LayoutChrome {
        let entries = NAVIGATION
            .iter()
            .map(|(label, href)| link_view(label, href))
            .collect();

        let mut links: Vec<NavigationLinkView> = self
            .profile
            .social
            .iter()
            .map(|link| link_view(&link.label, &link.href))
            .collect();
        if let Some(source) = &self.profile.source_url {
            links.push(link_view("view source", source));
        }

        LayoutChrome {
            brand: BrandView {
                title: self.profile.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                links,
                copyright: format!("© {year} {}", self.profile.owner),
            },
            meta: PageMetaView {
                title: self.profile.title.clone(),
                description: self.profile.description.clone(),
            },
        }
    }
}

fn link_view(label: &str, href: &str) -> NavigationLinkView {
    let external = LinkTarget::classify(href) == LinkTarget::External;
    NavigationLinkView {
        label: label.to_string(),
        href: href.to_string(),
        target: external.then(|| "_blank".to_string()),
        rel: external.then(|| "noopener noreferrer".to_string()),
    }
}
