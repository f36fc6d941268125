use anyhow::Result;
use rtnetlink::Handle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub index: u32,
    pub name: String,
    pub up: bool,
}

pub struct LinkLister {
    handle: Handle,
}

impl LinkLister {
    pub async fn new() -> Result<Self> {
        use rtnetlink::new_connection;
        let (connection, handle, _) = new_connection()?;
        tokio::spawn(connection);
        Ok(Self { handle })
    }

    /// All links known to the kernel, in index order
    pub async fn list_links(&self) -> Result<Vec<LinkInfo>> {
        use futures::stream::TryStreamExt;
        use netlink_packet_route::link::{LinkAttribute, LinkFlag};

        let mut found = vec![];
        let mut links = self.handle.link().get().execute();

        while let Some(link) = links.try_next().await? {
            let name = link.attributes.iter().find_map(|attr| {
                if let LinkAttribute::IfName(n) = attr {
                    Some(n.clone())
                } else {
                    None
                }
            });

            if let Some(name) = name {
                found.push(LinkInfo {
                    index: link.header.index,
                    name,
                    up: link.header.flags.contains(&LinkFlag::Up),
                });
            }
        }

        found.sort_by_key(|link| link.index);
        tracing::debug!(count = found.len(), "discovered links");
        Ok(found)
    }

    pub async fn link_names(&self) -> Result<Vec<String>> {
        let links = self.list_links().await?;
        for name in down(&links) {
            tracing::warn!(link = %name, "link is down; shaping rules apply once it comes up");
        }
        Ok(names(&links))
    }
}

/// Non-loopback links that are administratively down
pub fn down(links: &[LinkInfo]) -> Vec<&str> {
    links
        .iter()
        .filter(|link| !link.up && link.name != "lo")
        .map(|link| link.name.as_str())
        .collect()
}

/// Link names with loopback left out; shaping `lo` is never what the GUI wants
pub fn names(links: &[LinkInfo]) -> Vec<String> {
    links
        .iter()
        .filter(|link| link.name != "lo")
        .map(|link| link.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(index: u32, name: &str) -> LinkInfo {
        LinkInfo {
            index,
            name: name.to_string(),
            up: true,
        }
    }

    #[test]
    fn test_down_links() {
        let mut veth = link(4, "veth0");
        veth.up = false;
        let mut lo = link(1, "lo");
        lo.up = false;

        let links = vec![lo, link(2, "eth0"), veth];
        assert_eq!(down(&links), vec!["veth0"]);
        assert_eq!(names(&links), vec!["eth0", "veth0"]);
    }

    #[test]
    fn test_names_skip_loopback() {
        let links = vec![link(1, "lo"), link(2, "eth0"), link(3, "wlan0")];
        assert_eq!(names(&links), vec!["eth0", "wlan0"]);
    }
}
